//! Error types for geometry values
//!
//! Derived measurements never silently produce zero or NaN; every degenerate
//! input is reported through [`GeometryError`].

use thiserror::Error;

/// Result type alias for geometry operations
pub type GeometryResult<T> = std::result::Result<T, GeometryError>;

/// Errors raised by geometry value operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A line endpoint was absent (null on the wire)
    #[error("line is missing its {0} endpoint")]
    MissingEndpoint(&'static str),

    /// A coordinate was NaN or infinite
    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),

    /// Line endpoints coincide, so no length or direction exists
    #[error("zero-length line: start and end coincide at ({x}, {y}, {z})")]
    ZeroLength {
        /// X coordinate of the coincident endpoints (mm)
        x: f64,
        /// Y coordinate of the coincident endpoints (mm)
        y: f64,
        /// Z coordinate of the coincident endpoints (mm)
        z: f64,
    },

    /// Face has too few vertices or all vertices are collinear
    #[error("degenerate face: {0}")]
    DegenerateFace(String),

    /// Bounding box min exceeds max on some axis
    #[error("bounding box min must be ≤ max on the {axis} axis ({min} > {max})")]
    InvertedBounds {
        /// Axis name ("x", "y" or "z")
        axis: &'static str,
        /// Min coordinate on that axis
        min: f64,
        /// Max coordinate on that axis
        max: f64,
    },

    /// Parameter outside the accepted range
    #[error("parameter out of range: {0}")]
    OutOfRange(String),
}
