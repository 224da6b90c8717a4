use serde::{Deserialize, Serialize};

use super::point::{InternalPoint, Point3, Vector3};
use super::LENGTH_TOLERANCE_MM;
use crate::units::Millimeters;
use crate::{GeometryError, GeometryResult};

/// A straight segment between two points in millimeters.
///
/// Endpoints may be absent when decoded from the wire (`null` or missing).
/// Such a line can be held and passed around, but every derived measurement
/// fails with an explicit error. The same holds for non-finite or coincident
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    #[serde(default, alias = "p0")]
    start: Option<Point3>,
    #[serde(default, alias = "p1")]
    end: Option<Point3>,
}

impl Line {
    /// Create a line from two endpoints.
    pub fn new(start: Point3, end: Point3) -> Self {
        Line {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Create a line whose endpoints may be missing.
    pub fn from_endpoints(start: Option<Point3>, end: Option<Point3>) -> Self {
        Line { start, end }
    }

    /// Start point, if present.
    pub fn start(&self) -> Option<Point3> {
        self.start
    }

    /// End point, if present.
    pub fn end(&self) -> Option<Point3> {
        self.end
    }

    /// Both endpoints, checked to be present and finite.
    pub fn endpoints(&self) -> GeometryResult<(Point3, Point3)> {
        let start = self.start.ok_or(GeometryError::MissingEndpoint("start"))?;
        let end = self.end.ok_or(GeometryError::MissingEndpoint("end"))?;
        start.ensure_finite("line start")?;
        end.ensure_finite("line end")?;
        Ok((start, end))
    }

    /// Check that the line is usable: endpoints present, finite and distinct.
    pub fn validate(&self) -> GeometryResult<()> {
        self.checked_delta().map(|_| ())
    }

    /// Length of the segment.
    pub fn length(&self) -> GeometryResult<Millimeters> {
        let (_, delta) = self.checked_delta()?;
        Ok(Millimeters(delta.length()))
    }

    /// Unit direction from start to end.
    pub fn direction(&self) -> GeometryResult<Vector3> {
        let (_, delta) = self.checked_delta()?;
        delta.normalized()
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> GeometryResult<Point3> {
        self.point_at(0.5)
    }

    /// Point at parameter `t` in `[0, 1]` along the segment.
    pub fn point_at(&self, t: f64) -> GeometryResult<Point3> {
        if !(0.0..=1.0).contains(&t) {
            return Err(GeometryError::OutOfRange(format!(
                "line parameter {} not in [0, 1]",
                t
            )));
        }
        let (start, delta) = self.checked_delta()?;
        Ok(start + delta * t)
    }

    /// Endpoints converted to the host's internal unit.
    pub fn to_internal(&self) -> GeometryResult<(InternalPoint, InternalPoint)> {
        self.validate()?;
        let (start, end) = self.endpoints()?;
        Ok((start.to_internal(), end.to_internal()))
    }

    /// Line with start and end swapped.
    pub fn reversed(&self) -> Line {
        Line {
            start: self.end,
            end: self.start,
        }
    }

    fn checked_delta(&self) -> GeometryResult<(Point3, Vector3)> {
        let (start, end) = self.endpoints()?;
        let delta = end - start;
        let length = delta.length();
        if !length.is_finite() {
            return Err(GeometryError::NonFinite("line length"));
        }
        if length <= LENGTH_TOLERANCE_MM {
            return Err(GeometryError::ZeroLength {
                x: start.x,
                y: start.y,
                z: start.z,
            });
        }
        Ok((start, delta))
    }
}
