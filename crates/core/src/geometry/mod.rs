//! Geometry value types in millimeters
//!
//! All coordinates are external millimeters. Conversion to the host's internal
//! unit happens once, at the point of consumption, through `to_internal()`.

mod bounds;
mod face;
mod line;
mod point;

pub use bounds::BoundingBox;
pub use face::Face;
pub use line::Line;
pub use point::{InternalPoint, Point3, Vector3};

/// Lengths at or below this are treated as zero (mm).
pub const LENGTH_TOLERANCE_MM: f64 = 1e-9;
