use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::LENGTH_TOLERANCE_MM;
use crate::units::{Feet, Millimeters};
use crate::{GeometryError, GeometryResult};

/// A point in model space, coordinates in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate (mm)
    pub x: f64,
    /// Y coordinate (mm)
    pub y: f64,
    /// Z coordinate (mm)
    pub z: f64,
}

/// A point in the host's internal unit (feet).
///
/// Only produced by [`Point3::to_internal`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InternalPoint {
    /// X coordinate (ft)
    pub x: f64,
    /// Y coordinate (ft)
    pub y: f64,
    /// Z coordinate (ft)
    pub z: f64,
}

/// A displacement between two points. Unitless once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Point3 {
    /// The origin.
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a point from millimeter coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Fail with `NonFinite` unless every coordinate is finite.
    pub fn ensure_finite(&self, what: &'static str) -> GeometryResult<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(GeometryError::NonFinite(what))
        }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3) -> Millimeters {
        Millimeters((*other - *self).length())
    }

    /// Componentwise `self <= other`.
    pub fn le_componentwise(&self, other: &Point3) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }

    /// Convert to the host's internal unit.
    pub fn to_internal(&self) -> InternalPoint {
        InternalPoint {
            x: Millimeters(self.x).to_internal().value(),
            y: Millimeters(self.y).to_internal().value(),
            z: Millimeters(self.z).to_internal().value(),
        }
    }

    pub(crate) fn axes(&self) -> [(&'static str, f64); 3] {
        [("x", self.x), ("y", self.y), ("z", self.z)]
    }
}

impl InternalPoint {
    /// Convert back to millimeters.
    pub fn to_millimeters(&self) -> Point3 {
        Point3 {
            x: Feet(self.x).to_millimeters().value(),
            y: Feet(self.y).to_millimeters().value(),
            z: Feet(self.z).to_millimeters().value(),
        }
    }
}

impl Vector3 {
    /// Create a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Dot product.
    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Unit vector in the same direction.
    ///
    /// Fails instead of dividing by (near) zero.
    pub fn normalized(&self) -> GeometryResult<Vector3> {
        let len = self.length();
        if !len.is_finite() {
            return Err(GeometryError::NonFinite("vector"));
        }
        if len <= LENGTH_TOLERANCE_MM {
            return Err(GeometryError::OutOfRange(
                "cannot normalize a zero vector".to_string(),
            ));
        }
        Ok(*self / len)
    }
}

impl Sub for Point3 {
    type Output = Vector3;

    fn sub(self, rhs: Point3) -> Vector3 {
        Vector3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Add<Vector3> for Point3 {
    type Output = Point3;

    fn add(self, rhs: Vector3) -> Point3 {
        Point3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3 {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: f64) -> Vector3 {
        Vector3 {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}
