//! A first-order process model for exercising controllers without hardware

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

/// First-order lag, `tau * dy/dt = gain * u - y`,
/// integrated with explicit Euler steps.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub struct FirstOrderPlant {
    gain: f64,
    time_constant_s: f64,
    output: f64,
}

impl FirstOrderPlant {
    pub fn new(gain: f64, time_constant_s: f64, initial_output: f64) -> Self {
        Self {
            gain,
            time_constant_s,
            output: initial_output,
        }
    }

    /// Advance by `dt_s` seconds with input `u` held constant.
    ///
    /// A non-positive time constant makes the plant a pure gain.
    pub fn step(&mut self, u: f64, dt_s: f64) -> f64 {
        let target = self.gain * u;
        if self.time_constant_s <= 0.0 {
            self.output = target;
        } else {
            self.output += dt_s / self.time_constant_s * (target - self.output);
        }
        self.output
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}
