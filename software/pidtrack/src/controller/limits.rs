//! Clamping for setpoints, the integrator, and the control output

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

/// Clamp `value` to `[lower, upper]`.
///
/// Equal limits mean "no limit" and pass the value through unchanged.
/// Inverted limits (`lower > upper`) are not rejected: values below `lower`
/// return `lower` and every other value returns `upper`.
/// NaN fails every comparison and passes through.
#[inline]
pub fn limiter(value: f64, lower: f64, upper: f64) -> f64 {
    if lower == upper {
        value
    } else if value < lower {
        lower
    } else if value > upper {
        upper
    } else {
        value
    }
}

/// A lower/upper clamp pair. Equal bounds disable clamping.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub struct Limits {
    pub lower: f64,
    pub upper: f64,
}

impl Limits {
    /// Clamping disabled
    pub const DISABLED: Self = Self {
        lower: -1.0,
        upper: -1.0,
    };

    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn is_enabled(&self) -> bool {
        self.lower != self.upper
    }

    pub fn apply(&self, value: f64) -> f64 {
        limiter(value, self.lower, self.upper)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl From<(f64, f64)> for Limits {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self::new(lower, upper)
    }
}
