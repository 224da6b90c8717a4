//! Length units at the host boundary
//!
//! Externally supplied lengths are millimeters. The host's internal length
//! unit is the foot, and `1 ft = 304.8 mm`. The two units are distinct types
//! so a length can only be converted once: converting [`Millimeters`] yields
//! [`Feet`], and there is no conversion from `Feet` to `Feet`.

use serde::{Deserialize, Serialize};

/// Millimeters per internal unit (foot). Fixed by definition.
pub const MM_PER_FOOT: f64 = 304.8;

/// A length expressed in the external unit (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// A length expressed in the host's internal unit (feet).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

impl Millimeters {
    /// Convert to the host's internal unit.
    pub fn to_internal(self) -> Feet {
        Feet(self.0 / MM_PER_FOOT)
    }

    /// Raw value in millimeters.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Feet {
    /// Convert back to the external unit.
    pub fn to_millimeters(self) -> Millimeters {
        Millimeters(self.0 * MM_PER_FOOT)
    }

    /// Raw value in feet.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Millimeters> for Feet {
    fn from(mm: Millimeters) -> Self {
        mm.to_internal()
    }
}

impl From<Feet> for Millimeters {
    fn from(ft: Feet) -> Self {
        ft.to_millimeters()
    }
}
