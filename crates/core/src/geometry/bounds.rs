use serde::Serialize;

use super::point::{InternalPoint, Point3};
use crate::{GeometryError, GeometryResult};

/// An axis-aligned box in millimeters with `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    min: Point3,
    max: Point3,
}

impl BoundingBox {
    /// Create a bounding box, checking finiteness and corner ordering.
    pub fn new(min: Point3, max: Point3) -> GeometryResult<Self> {
        min.ensure_finite("bounding box min")?;
        max.ensure_finite("bounding box max")?;
        for ((axis, lo), (_, hi)) in min.axes().into_iter().zip(max.axes()) {
            if lo > hi {
                return Err(GeometryError::InvertedBounds {
                    axis,
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(BoundingBox { min, max })
    }

    /// Minimum corner.
    pub fn min(&self) -> Point3 {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> Point3 {
        self.max
    }

    /// True when the point lies inside or on the boundary.
    pub fn contains(&self, point: &Point3) -> bool {
        self.min.le_componentwise(point) && point.le_componentwise(&self.max)
    }

    /// True when the two boxes overlap or touch.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.le_componentwise(&other.max) && other.min.le_componentwise(&self.max)
    }

    /// Corners in the host's internal unit.
    pub fn to_internal(&self) -> (InternalPoint, InternalPoint) {
        (self.min.to_internal(), self.max.to_internal())
    }
}
