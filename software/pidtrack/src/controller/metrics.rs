//! Step-response performance tracking and reporting

use std::time::Duration;

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::timer::Timer;

/// Default half-width of the relative settling band (5% of setpoint)
pub const DEFAULT_SETTLING_BAND: f64 = 0.05;

/// Performance of the current step response, measured from the last
/// call to `Controller::target_setpoint`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub struct StepMetrics {
    /// Time at which the largest overshoot so far was observed
    pub peak_time: Option<Duration>,

    /// Largest `process_variable / setpoint` ratio observed while
    /// the process variable exceeded the setpoint
    pub overshoot: Option<f64>,

    /// Time at which the process variable first entered the settling band
    pub settling_time: Option<Duration>,
}

impl StepMetrics {
    pub fn has_settled(&self) -> bool {
        self.settling_time.is_some()
    }

    /// Overshoot ratio, or 0 if none has been observed
    pub fn overshoot_ratio(&self) -> f64 {
        self.overshoot.unwrap_or(0.0)
    }

    /// Overshoot past the setpoint in percent, or 0 if none has been observed
    pub fn percent_overshoot(&self) -> f64 {
        self.overshoot.map_or(0.0, |r| (r - 1.0) * 100.0)
    }

    /// Evaluate one sample against the setpoint.
    ///
    /// Returns the metrics when this sample is the first to enter the
    /// settling band; the performance timer is stopped at that point.
    /// A zero setpoint has no defined ratio and is not tracked.
    pub(crate) fn observe<T: Timer>(
        &mut self,
        process_variable: f64,
        setpoint: f64,
        settling_band: f64,
        performance_timer: &mut T,
    ) -> Option<StepMetrics> {
        if setpoint == 0.0 {
            debug!("Zero setpoint; skipping overshoot and settling tracking");
            return None;
        }

        let ratio = process_variable / setpoint;
        let percent = ratio - 1.0;

        if percent > 0.0 && self.overshoot.is_none_or(|peak| ratio > peak) {
            self.overshoot = Some(ratio);
            self.peak_time = Some(performance_timer.elapsed());
        }

        if percent.abs() < settling_band && self.settling_time.is_none() {
            performance_timer.stop();
            self.settling_time = Some(performance_timer.elapsed());
            return Some(*self);
        }

        None
    }
}

/// Receives step metrics once per step response, when settling is first detected.
///
/// A failed report is logged and does not interrupt the control computation.
pub trait MetricsObserver: Send {
    fn report(&mut self, metrics: &StepMetrics) -> Result<(), String>;
}

impl<F> MetricsObserver for F
where
    F: FnMut(&StepMetrics) + Send,
{
    fn report(&mut self, metrics: &StepMetrics) -> Result<(), String> {
        self(metrics);
        Ok(())
    }
}

/// Default observer: writes the metrics to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl MetricsObserver for LogObserver {
    fn report(&mut self, metrics: &StepMetrics) -> Result<(), String> {
        info!(
            peak_time = ?metrics.peak_time,
            percent_overshoot = metrics.percent_overshoot(),
            settling_time = ?metrics.settling_time,
            "Step response settled"
        );
        Ok(())
    }
}
