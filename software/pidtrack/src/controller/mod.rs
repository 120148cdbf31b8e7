//! The PID controller and its per-sample computation

mod limits;
mod metrics;

use tracing::{debug, warn};

pub use limits::{Limits, limiter};
pub use metrics::{DEFAULT_SETTLING_BAND, LogObserver, MetricsObserver, StepMetrics};

use crate::config::PidConfig;
use crate::timer::{Stopwatch, Timer};

/// Discrete-time PID controller with step-response tracking.
///
/// The sampling interval is measured between calls to `calc` by the sample
/// timer, so the caller only supplies measurements. The performance timer
/// runs from the last `target_setpoint` until settling is detected.
///
/// The derivative term acts on the setpoint, not the measurement,
/// and the integrator is clamped to the output limits after every update.
pub struct Controller<T: Timer = Stopwatch> {
    // Gains
    kp: f64,
    ki: f64,
    kd: f64,

    // Limits
    input_limits: Limits,
    output_limits: Limits,
    settling_band: f64,

    // Target
    setpoint: f64,
    last_setpoint: f64,

    // Internal state
    integrator: f64,
    last_output: f64,
    metrics: StepMetrics,

    // Appendages
    sample_timer: T,
    performance_timer: T,
    observer: Box<dyn MetricsObserver>,
}

impl Controller<Stopwatch> {
    /// Gains only, with limits disabled
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::from_config(&PidConfig::new(kp, ki, kd))
    }

    /// Gains and output limits, with input limits disabled
    pub fn with_output_limits(
        kp: f64,
        ki: f64,
        kd: f64,
        lower_output_limit: f64,
        upper_output_limit: f64,
    ) -> Self {
        let cfg = PidConfig::new(kp, ki, kd)
            .with_output_limits(lower_output_limit, upper_output_limit);
        Self::from_config(&cfg)
    }

    /// Gains, input limits, and output limits
    pub fn with_limits(
        kp: f64,
        ki: f64,
        kd: f64,
        input_limits: impl Into<Limits>,
        output_limits: impl Into<Limits>,
    ) -> Self {
        let mut cfg = PidConfig::new(kp, ki, kd);
        cfg.input_limits = input_limits.into();
        cfg.output_limits = output_limits.into();
        Self::from_config(&cfg)
    }

    /// Build a wall-clock controller from a config
    pub fn from_config(cfg: &PidConfig) -> Self {
        Self::with_timers(cfg, Stopwatch::new(), Stopwatch::new())
    }
}

impl Default for Controller<Stopwatch> {
    fn default() -> Self {
        Self::from_config(&PidConfig::default())
    }
}

impl<T: Timer> Controller<T> {
    /// Build a controller driving the provided timers
    ///
    /// An invalid settling band is accepted with a warning; see `set_settling_band`.
    pub fn with_timers(cfg: &PidConfig, sample_timer: T, performance_timer: T) -> Self {
        if let Err(e) = cfg.validate() {
            warn!("{e}; settling detection is disabled");
        }
        let mut controller = Self {
            kp: cfg.kp,
            ki: cfg.ki,
            kd: cfg.kd,

            input_limits: cfg.input_limits,
            output_limits: cfg.output_limits,
            settling_band: cfg.settling_band,

            setpoint: 0.0,
            last_setpoint: 0.0,

            integrator: 0.0,
            last_output: 0.0,
            metrics: StepMetrics::default(),

            sample_timer,
            performance_timer,
            observer: Box::new(LogObserver),
        };
        controller.reset();
        controller
    }

    /// Replace the receiver of settling reports
    pub fn set_observer(&mut self, observer: impl MetricsObserver + 'static) {
        self.observer = Box::new(observer);
    }

    /// Builder form of `set_observer`
    pub fn with_observer(mut self, observer: impl MetricsObserver + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Bounds on requested setpoints. Equal bounds disable clamping.
    pub fn set_input_limits(&mut self, lower: f64, upper: f64) {
        self.input_limits = Limits::new(lower, upper);
    }

    /// Bounds on the integrator and the control output. Equal bounds disable clamping.
    pub fn set_output_limits(&mut self, lower: f64, upper: f64) {
        self.output_limits = Limits::new(lower, upper);
    }

    /// Relative half-width of the settling band.
    ///
    /// A band that is not finite and positive can never contain the
    /// process variable, so settling is never detected or reported.
    pub fn set_settling_band(&mut self, settling_band: f64) {
        if !(settling_band.is_finite() && settling_band > 0.0) {
            warn!("Settling band {settling_band} disables settling detection");
        }
        self.settling_band = settling_band;
    }

    /// Start a new step response toward `setpoint`, clamped to the input limits.
    ///
    /// Clears the performance metrics and restarts both timers.
    pub fn target_setpoint(&mut self, setpoint: f64) {
        self.setpoint = self.input_limits.apply(setpoint);
        self.metrics = StepMetrics::default();
        self.sample_timer.start();
        self.performance_timer.start();
    }

    /// Clear the target, integrator, and performance state and stop both timers.
    /// Gains and limits are kept.
    pub fn reset(&mut self) {
        self.setpoint = 0.0;
        self.last_setpoint = 0.0;
        self.integrator = 0.0;
        self.last_output = 0.0;
        self.metrics = StepMetrics::default();
        self.sample_timer.reset();
        self.performance_timer.reset();
    }

    /// Whether the current step response has entered the settling band
    pub fn has_settled(&self) -> bool {
        self.metrics.has_settled()
    }

    /// Compute the control output for the latest measurement.
    ///
    /// Called once per control-loop tick. The sampling interval is the time
    /// since the previous call, or since `target_setpoint` on the first call.
    /// A zero interval contributes no derivative or integral action.
    ///
    /// A NaN measurement is dropped: the previous output is returned, clamped
    /// to the current output limits, and no state changes. The sample timer
    /// keeps running so the next valid sample integrates over the whole gap.
    /// An infinite error saturates the proportional term but is not integrated.
    pub fn calc(&mut self, process_variable: f64) -> f64 {
        if process_variable.is_nan() {
            debug!("NaN process variable; holding previous output");
            return self.output_limits.apply(self.last_output);
        }

        self.sample_timer.stop();
        let sampling_time = self.sample_timer.elapsed().as_secs_f64();

        // Performance tracking
        if let Some(metrics) = self.metrics.observe(
            process_variable,
            self.setpoint,
            self.settling_band,
            &mut self.performance_timer,
        ) {
            if let Err(e) = self.observer.report(&metrics) {
                warn!("Failed to report step metrics: {e}");
            }
        }

        // Control law
        let error = self.setpoint - process_variable;
        let differentiator = if sampling_time > 0.0 {
            (self.setpoint - self.last_setpoint) / sampling_time
        } else {
            debug!("Zero sampling interval; skipping derivative and integral action");
            0.0
        };
        if error.is_finite() {
            self.integrator += error * sampling_time;
            self.integrator = self.output_limits.apply(self.integrator);
        } else {
            debug!("Non-finite error {error}; skipping integrator update");
        }

        let control_variable =
            self.kp * error + self.ki * self.integrator - self.kd * differentiator;
        let control_variable = self.output_limits.apply(control_variable);

        self.last_output = control_variable;
        self.last_setpoint = self.setpoint;
        self.sample_timer.start();

        control_variable
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn input_limits(&self) -> Limits {
        self.input_limits
    }

    pub fn output_limits(&self) -> Limits {
        self.output_limits
    }

    pub fn settling_band(&self) -> f64 {
        self.settling_band
    }

    pub fn integrator(&self) -> f64 {
        self.integrator
    }

    /// Performance of the current step response
    pub fn metrics(&self) -> StepMetrics {
        self.metrics
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> PidConfig {
        PidConfig {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            input_limits: self.input_limits,
            output_limits: self.output_limits,
            settling_band: self.settling_band,
        }
    }
}

/// Copies configuration, target, integrator, performance state and timers.
/// The observer is not cloneable, so the clone reports to the log.
impl<T: Timer + Clone> Clone for Controller<T> {
    fn clone(&self) -> Self {
        Self {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            input_limits: self.input_limits,
            output_limits: self.output_limits,
            settling_band: self.settling_band,
            setpoint: self.setpoint,
            last_setpoint: self.last_setpoint,
            integrator: self.integrator,
            last_output: self.last_output,
            metrics: self.metrics,
            sample_timer: self.sample_timer.clone(),
            performance_timer: self.performance_timer.clone(),
            observer: Box::new(LogObserver),
        }
    }
}

impl<T: Timer> core::fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("kp", &self.kp)
            .field("ki", &self.ki)
            .field("kd", &self.kd)
            .field("input_limits", &self.input_limits)
            .field("output_limits", &self.output_limits)
            .field("settling_band", &self.settling_band)
            .field("setpoint", &self.setpoint)
            .field("last_setpoint", &self.last_setpoint)
            .field("integrator", &self.integrator)
            .field("last_output", &self.last_output)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::plant::FirstOrderPlant;
    use crate::timer::{SimClock, SimTimer};

    fn sim(cfg: &PidConfig) -> (SimClock, Controller<SimTimer>) {
        let clock = SimClock::new();
        let controller = Controller::with_timers(cfg, clock.timer(), clock.timer());
        (clock, controller)
    }

    fn capture(controller: &mut Controller<SimTimer>) -> Arc<Mutex<Vec<StepMetrics>>> {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        controller.set_observer(move |m: &StepMetrics| sink.lock().unwrap().push(*m));
        reports
    }

    #[test]
    fn proportional_only() {
        let (_clock, mut pid) = sim(&PidConfig::new(1.0, 0.0, 0.0));
        pid.target_setpoint(10.0);
        let cv = pid.calc(0.0);
        assert_eq!(cv, 10.0);
    }

    #[test]
    fn setpoint_is_clamped_to_input_limits() {
        let (_clock, mut pid) = sim(&PidConfig::new(1.0, 0.0, 0.0).with_input_limits(-5.0, 5.0));
        for (requested, expected) in [(10.0, 5.0), (-10.0, -5.0), (2.5, 2.5)] {
            pid.target_setpoint(requested);
            assert_eq!(pid.setpoint(), expected);
            assert_eq!(pid.setpoint(), limiter(requested, -5.0, 5.0));
        }

        // Disabled limits pass anything through
        pid.set_input_limits(3.0, 3.0);
        pid.target_setpoint(1e6);
        assert_eq!(pid.setpoint(), 1e6);
    }

    #[test]
    fn setters_overwrite_without_validation() {
        let mut pid: Controller = Controller::default();
        assert_eq!((pid.kp(), pid.ki(), pid.kd()), (0.0, 0.0, 0.0));

        pid.set_gains(-1.0, 0.0, 2.5);
        assert_eq!((pid.kp(), pid.ki(), pid.kd()), (-1.0, 0.0, 2.5));

        pid.set_output_limits(10.0, -10.0);
        assert_eq!(pid.output_limits(), Limits::new(10.0, -10.0));
        pid.set_input_limits(1.0, 2.0);
        assert_eq!(pid.input_limits(), Limits::new(1.0, 2.0));

        assert_eq!(pid.settling_band(), DEFAULT_SETTLING_BAND);
        pid.set_settling_band(0.1);
        assert_eq!(pid.settling_band(), 0.1);
    }

    #[test]
    fn constructors_wire_limits() {
        let pid = Controller::new(1.0, 2.0, 3.0);
        assert!(!pid.input_limits().is_enabled());
        assert!(!pid.output_limits().is_enabled());

        let pid = Controller::with_output_limits(1.0, 2.0, 3.0, 0.0, 100.0);
        assert!(!pid.input_limits().is_enabled());
        assert_eq!(pid.output_limits(), Limits::new(0.0, 100.0));

        let pid = Controller::with_limits(1.0, 2.0, 3.0, (0.0, 50.0), (-1.0, 1.0));
        assert_eq!(pid.input_limits(), Limits::new(0.0, 50.0));
        assert_eq!(pid.output_limits(), Limits::new(-1.0, 1.0));
        assert_eq!(pid.setpoint(), 0.0);
        assert!(!pid.has_settled());
    }

    #[test]
    fn config_roundtrip_through_controller() {
        let cfg = PidConfig::new(2.0, 0.5, 0.1)
            .with_input_limits(0.0, 300.0)
            .with_output_limits(0.0, 100.0)
            .with_settling_band(0.02);
        let pid = Controller::from_config(&cfg);
        assert_eq!(pid.config(), cfg);
    }

    #[test]
    fn zero_gains_output_zero() {
        let (clock, mut pid) = sim(&PidConfig::new(0.0, 0.0, 0.0));
        pid.target_setpoint(50.0);
        for pv in [-1e6, -3.0, 0.0, 49.0, 50.0, 1e6] {
            clock.advance_secs(0.1);
            assert_eq!(pid.calc(pv), 0.0, "pv {pv}");
        }

        // Clamped like any other output
        pid.set_output_limits(1.0, 5.0);
        clock.advance_secs(0.1);
        assert_eq!(pid.calc(0.0), 1.0);
    }

    #[test]
    fn integrator_is_bounded_by_output_limits() {
        let cfg = PidConfig::new(0.0, 1.0, 0.0).with_output_limits(-2.0, 2.0);
        let (clock, mut pid) = sim(&cfg);

        pid.target_setpoint(100.0);
        for _ in 0..50 {
            clock.advance_secs(1.0);
            let cv = pid.calc(0.0);
            assert!(pid.integrator() <= 2.0 && pid.integrator() >= -2.0);
            assert!(cv <= 2.0);
        }
        assert_eq!(pid.integrator(), 2.0);

        pid.target_setpoint(-100.0);
        for _ in 0..50 {
            clock.advance_secs(1.0);
            pid.calc(0.0);
            assert!(pid.integrator() <= 2.0 && pid.integrator() >= -2.0);
        }
        assert_eq!(pid.integrator(), -2.0);
    }

    #[test]
    fn integrator_accumulates_error_times_interval() {
        let (clock, mut pid) = sim(&PidConfig::new(0.0, 1.0, 0.0));
        pid.target_setpoint(4.0);
        clock.advance_secs(0.5);
        let cv = pid.calc(2.0);
        assert!((pid.integrator() - 1.0).abs() < 1e-12);
        assert!((cv - 1.0).abs() < 1e-12);

        clock.advance_secs(0.25);
        pid.calc(0.0);
        assert!((pid.integrator() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn output_is_bounded_by_output_limits() {
        let cfg = PidConfig::new(50.0, 10.0, 5.0).with_output_limits(-1.0, 1.0);
        let (clock, mut pid) = sim(&cfg);
        pid.target_setpoint(10.0);
        for pv in [-100.0, 0.0, 9.9, 10.0, 10.1, 100.0, f64::MAX, f64::MIN] {
            clock.advance_secs(0.01);
            let cv = pid.calc(pv);
            assert!((-1.0..=1.0).contains(&cv), "pv {pv} gave cv {cv}");
        }
    }

    #[test]
    fn derivative_acts_on_setpoint_changes() {
        let (clock, mut pid) = sim(&PidConfig::new(0.0, 0.0, 1.0));
        pid.target_setpoint(2.0);
        clock.advance_secs(0.5);

        // Setpoint stepped 0 -> 2 over 0.5s
        let cv = pid.calc(0.0);
        assert!((cv + 4.0).abs() < 1e-12, "cv {cv}");

        // Measurement changes alone have no derivative effect
        clock.advance_secs(0.5);
        assert_eq!(pid.calc(1.5), 0.0);
    }

    #[test]
    fn zero_interval_has_no_derivative_or_integral() {
        let (_clock, mut pid) = sim(&PidConfig::new(1.0, 1.0, 1.0));
        pid.target_setpoint(10.0);

        // Clock never moves
        for _ in 0..3 {
            let cv = pid.calc(4.0);
            assert_eq!(cv, 6.0);
            assert!(cv.is_finite());
        }
        assert_eq!(pid.integrator(), 0.0);

        // Never started at all
        let (_clock, mut fresh) = sim(&PidConfig::new(1.0, 1.0, 1.0));
        assert_eq!(fresh.calc(3.0), -3.0);
    }

    #[test]
    fn zero_setpoint_skips_tracking() {
        let (clock, mut pid) = sim(&PidConfig::new(1.0, 0.0, 0.0));
        let reports = capture(&mut pid);
        pid.target_setpoint(0.0);
        for pv in [5.0, 0.0, -5.0, 0.001] {
            clock.advance_secs(0.1);
            let cv = pid.calc(pv);
            assert_eq!(cv, -pv);
        }
        assert!(!pid.has_settled());
        assert_eq!(pid.metrics(), StepMetrics::default());
        assert!(reports.lock().unwrap().is_empty());
    }

    #[test]
    fn settles_at_first_sample_within_band() {
        let (clock, mut pid) = sim(&PidConfig::new(1.0, 0.0, 0.0));
        let reports = capture(&mut pid);
        pid.target_setpoint(100.0);

        let mut settled = Vec::new();
        for pv in [0.0, 50.0, 95.0, 100.0, 99.0] {
            clock.advance_secs(1.0);
            pid.calc(pv);
            settled.push(pid.has_settled());
        }

        // 95 sits on the band edge, not inside it
        assert_eq!(settled, [false, false, false, true, true]);
        assert_eq!(pid.metrics().settling_time, Some(Duration::from_secs(4)));

        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].settling_time, Some(Duration::from_secs(4)));
    }

    #[test]
    fn settling_time_latches() {
        let (clock, mut pid) = sim(&PidConfig::new(1.0, 0.0, 0.0));
        let reports = capture(&mut pid);
        pid.target_setpoint(10.0);

        clock.advance_secs(2.0);
        pid.calc(10.1);
        assert!(pid.has_settled());
        let settled_at = pid.metrics().settling_time;

        // Leave and re-enter the band
        for pv in [5.0, 20.0, 10.0, 9.9] {
            clock.advance_secs(1.0);
            pid.calc(pv);
            assert!(pid.has_settled());
            assert_eq!(pid.metrics().settling_time, settled_at);
        }
        assert_eq!(reports.lock().unwrap().len(), 1);

        // New target re-arms tracking
        pid.target_setpoint(20.0);
        assert!(!pid.has_settled());
        assert_eq!(pid.metrics(), StepMetrics::default());
        clock.advance_secs(0.5);
        pid.calc(20.0);
        assert_eq!(pid.metrics().settling_time, Some(Duration::from_millis(500)));
        assert_eq!(reports.lock().unwrap().len(), 2);
    }

    #[test]
    fn tracks_overshoot_before_settling() {
        let (clock, mut pid) = sim(&PidConfig::new(1.0, 0.0, 0.0));
        let reports = capture(&mut pid);
        pid.target_setpoint(10.0);

        for pv in [5.0, 12.0, 11.0, 10.2] {
            clock.advance_secs(1.0);
            pid.calc(pv);
        }

        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        let m = reports[0];
        assert_eq!(m.overshoot, Some(1.2));
        assert_eq!(m.peak_time, Some(Duration::from_secs(2)));
        assert_eq!(m.settling_time, Some(Duration::from_secs(4)));
        assert!((m.percent_overshoot() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn reset_returns_to_fresh_state() {
        let cfg = PidConfig::new(2.0, 1.0, 0.0).with_output_limits(-50.0, 50.0);
        let (clock, mut pid) = sim(&cfg);
        pid.target_setpoint(10.0);
        for pv in [0.0, 9.9, 12.0] {
            clock.advance_secs(1.0);
            pid.calc(pv);
        }
        assert!(pid.has_settled());
        assert!(pid.integrator() != 0.0);

        pid.reset();
        assert_eq!(pid.setpoint(), 0.0);
        assert_eq!(pid.integrator(), 0.0);
        assert!(!pid.has_settled());
        assert_eq!(pid.metrics(), StepMetrics::default());
        assert_eq!(pid.config(), cfg);

        let (_fresh_clock, mut fresh) = sim(&cfg);
        clock.advance_secs(1.0);
        for pv in [3.0, -2.0] {
            assert_eq!(pid.calc(pv), fresh.calc(pv));
        }
    }

    #[test]
    fn nan_measurement_does_not_corrupt_state() {
        let cfg = PidConfig::new(1.0, 1.0, 0.0).with_output_limits(-5.0, 5.0);
        let (clock, mut pid) = sim(&cfg);
        pid.target_setpoint(10.0);

        clock.advance_secs(1.0);
        let before = pid.calc(8.0);
        assert_eq!(before, 4.0);

        // Dropped sample holds the last output
        clock.advance_secs(1.0);
        assert_eq!(pid.calc(f64::NAN), before);
        assert_eq!(pid.integrator(), 2.0);

        // Next valid sample integrates over both intervals
        clock.advance_secs(1.0);
        let cv = pid.calc(9.0);
        assert!((-5.0..=5.0).contains(&cv), "cv {cv}");
        assert!(pid.integrator().is_finite());
        assert_eq!(pid.integrator(), 4.0);
        assert_eq!(cv, 5.0);
    }

    #[test]
    fn infinite_measurement_is_not_integrated() {
        let (clock, mut pid) = sim(&PidConfig::new(1.0, 1.0, 0.0));
        pid.target_setpoint(10.0);

        clock.advance_secs(1.0);
        assert_eq!(pid.calc(f64::INFINITY), f64::NEG_INFINITY);
        assert_eq!(pid.integrator(), 0.0);

        clock.advance_secs(1.0);
        let cv = pid.calc(9.0);
        assert!(cv.is_finite(), "cv {cv}");
        assert_eq!(pid.integrator(), 1.0);
    }

    #[test]
    fn invalid_settling_band_never_settles() {
        for band in [0.0, -0.05, f64::NAN] {
            let cfg = PidConfig::new(1.0, 0.0, 0.0).with_settling_band(band);
            let (clock, mut pid) = sim(&cfg);
            let reports = capture(&mut pid);
            pid.target_setpoint(10.0);
            clock.advance_secs(1.0);
            pid.calc(10.0);
            assert!(!pid.has_settled(), "band {band}");
            assert!(reports.lock().unwrap().is_empty());

            // A valid band restores detection on the next sample
            pid.set_settling_band(0.05);
            clock.advance_secs(1.0);
            pid.calc(10.0);
            assert!(pid.has_settled(), "band {band}");
        }
    }

    #[test]
    fn observer_failure_does_not_abort_calc() {
        struct Failing;
        impl MetricsObserver for Failing {
            fn report(&mut self, _: &StepMetrics) -> Result<(), String> {
                Err("sink closed".to_owned())
            }
        }

        let (clock, mut pid) = sim(&PidConfig::new(1.0, 0.0, 0.0));
        pid.set_observer(Failing);
        pid.target_setpoint(10.0);
        clock.advance_secs(1.0);
        assert_eq!(pid.calc(10.0), 0.0);
        assert!(pid.has_settled());
    }

    #[test]
    fn clone_copies_all_state() {
        let cfg = PidConfig::new(1.0, 2.0, 3.0)
            .with_input_limits(-100.0, 100.0)
            .with_output_limits(-7.0, 9.0);
        let (clock, mut pid) = sim(&cfg);
        pid.target_setpoint(10.0);
        clock.advance_secs(1.0);
        pid.calc(12.0);

        let copy = pid.clone();
        assert_eq!(copy.config(), pid.config());
        assert_eq!(copy.output_limits(), Limits::new(-7.0, 9.0));
        assert_eq!(copy.setpoint(), pid.setpoint());
        assert_eq!(copy.integrator(), pid.integrator());
        assert_eq!(copy.metrics(), pid.metrics());
    }

    #[test]
    fn closed_loop_settles_on_first_order_plant() {
        let cfg = PidConfig::new(2.0, 2.0, 0.0).with_output_limits(0.0, 100.0);
        let (clock, mut pid) = sim(&cfg);
        let reports = capture(&mut pid);
        let mut plant = FirstOrderPlant::new(1.0, 1.0, 0.0);
        let dt_s = 0.01;

        pid.target_setpoint(10.0);
        let mut y = plant.output();
        for _ in 0..1000 {
            clock.advance_secs(dt_s);
            let u = pid.calc(y);
            y = plant.step(u, dt_s);
        }

        assert!(pid.has_settled());
        let settling_time = pid.metrics().settling_time.unwrap();
        assert!(settling_time < Duration::from_secs(10), "{settling_time:?}");
        assert!((y - 10.0).abs() < 0.1, "final output {y}");
        assert_eq!(reports.lock().unwrap().len(), 1);
    }
}
