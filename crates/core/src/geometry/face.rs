use serde::{Deserialize, Serialize};

use super::point::{Point3, Vector3};
use super::LENGTH_TOLERANCE_MM;
use crate::{GeometryError, GeometryResult};

/// A closed planar polygon, vertices in millimeters.
///
/// The closing edge from the last vertex back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Face {
    /// Polygon vertices in order
    #[serde(default)]
    pub vertices: Vec<Point3>,
}

impl Face {
    /// Create a face from an ordered vertex loop.
    pub fn new(vertices: Vec<Point3>) -> Self {
        Face { vertices }
    }

    /// Check that the face has at least 3 finite, non-collinear vertices.
    pub fn validate(&self) -> GeometryResult<()> {
        self.newell().map(|_| ())
    }

    /// Enclosed area in square millimeters.
    pub fn area(&self) -> GeometryResult<f64> {
        Ok(self.newell()?.length() / 2.0)
    }

    /// Unit normal, oriented by the vertex winding (right-hand rule).
    pub fn normal(&self) -> GeometryResult<Vector3> {
        self.newell()?.normalized()
    }

    /// Total edge length including the closing edge.
    pub fn perimeter(&self) -> GeometryResult<f64> {
        self.newell()?;
        let n = self.vertices.len();
        Ok((0..n)
            .map(|i| {
                self.vertices[i]
                    .distance_to(&self.vertices[(i + 1) % n])
                    .value()
            })
            .sum())
    }

    /// Average of the vertices.
    pub fn centroid(&self) -> GeometryResult<Point3> {
        self.newell()?;
        let n = self.vertices.len() as f64;
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::default(), |acc, p| acc + (*p - Point3::ORIGIN));
        Ok(Point3::ORIGIN + sum / n)
    }

    // Newell's method: the returned vector's length is twice the area.
    fn newell(&self) -> GeometryResult<Vector3> {
        if self.vertices.len() < 3 {
            return Err(GeometryError::DegenerateFace(format!(
                "needs at least 3 vertices, got {}",
                self.vertices.len()
            )));
        }
        for v in &self.vertices {
            v.ensure_finite("face vertex")?;
        }
        let n = self.vertices.len();
        let mut acc = Vector3::default();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            acc.x += (a.y - b.y) * (a.z + b.z);
            acc.y += (a.z - b.z) * (a.x + b.x);
            acc.z += (a.x - b.x) * (a.y + b.y);
        }
        if acc.length() <= LENGTH_TOLERANCE_MM {
            return Err(GeometryError::DegenerateFace(
                "vertices are collinear or coincident".to_string(),
            ));
        }
        Ok(acc)
    }
}
