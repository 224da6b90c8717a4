//! Core value types for hostbridge
//!
//! This crate defines the plain values shared by every other crate:
//! - Payload: the structured value carried by requests and results
//! - Units: millimeter/foot newtypes and the fixed conversion factor
//! - Geometry: points, lines, faces and bounding boxes in millimeters
//! - Error: geometry error type
//!
//! Nothing in here synchronizes or allocates threads; all types are pure values.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod units;

pub use error::{GeometryError, GeometryResult};
pub use geometry::{BoundingBox, Face, InternalPoint, Line, Point3, Vector3};
pub use units::{Feet, Millimeters, MM_PER_FOOT};

/// Structured, schema-less payload carried by requests and results.
///
/// Transport decoding produces this; typed command requests are decoded
/// from it at the dispatch boundary.
pub type Payload = serde_json::Value;
