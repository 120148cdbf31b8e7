//! Elapsed-time sources for the controller's sample and performance timers.
//!
//! The controller never reads a clock directly. It drives two `Timer`s, which
//! are wall-clock `Stopwatch`es in normal operation and `SimTimer`s sharing a
//! `SimClock` when the caller wants deterministic time (simulation and tests).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A start/stop interval timer.
pub trait Timer {
    /// Begin measuring from now, discarding any previous interval.
    fn start(&mut self);

    /// Stop measuring. The elapsed value is frozen until the next `start`.
    /// Stopping a timer that is not running has no effect.
    fn stop(&mut self);

    /// Time since the last `start`, whether running or stopped.
    /// Zero if the timer has never been started since construction or `reset`.
    fn elapsed(&self) -> Duration;

    /// Stop and discard the recorded interval.
    fn reset(&mut self);
}

/// Wall-clock timer backed by `std::time::Instant`
#[derive(Clone, Copy, Debug, Default)]
pub struct Stopwatch {
    state: StopwatchState,
}

#[derive(Clone, Copy, Debug, Default)]
enum StopwatchState {
    #[default]
    Idle,
    Running(Instant),
    Stopped(Duration),
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, StopwatchState::Running(_))
    }
}

impl Timer for Stopwatch {
    fn start(&mut self) {
        self.state = StopwatchState::Running(Instant::now());
    }

    fn stop(&mut self) {
        if let StopwatchState::Running(t0) = self.state {
            self.state = StopwatchState::Stopped(t0.elapsed());
        }
    }

    fn elapsed(&self) -> Duration {
        match self.state {
            StopwatchState::Idle => Duration::ZERO,
            StopwatchState::Running(t0) => t0.elapsed(),
            StopwatchState::Stopped(dt) => dt,
        }
    }

    fn reset(&mut self) {
        self.state = StopwatchState::Idle;
    }
}

/// Manually advanced clock shared between any number of `SimTimer`s.
///
/// Clones refer to the same underlying time.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now_ns: Arc<AtomicU64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the clock was created
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns.load(Ordering::Acquire))
    }

    /// Move time forward
    pub fn advance(&self, dt: Duration) {
        let dt_ns = u64::try_from(dt.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .now_ns
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                Some(t.saturating_add(dt_ns))
            });
    }

    /// Convenience for `advance(Duration::from_secs_f64(dt_s))`
    pub fn advance_secs(&self, dt_s: f64) {
        self.advance(Duration::from_secs_f64(dt_s));
    }

    /// Make a new idle timer that reads this clock
    pub fn timer(&self) -> SimTimer {
        SimTimer {
            clock: self.clone(),
            state: SimState::Idle,
        }
    }
}

/// Timer that reads a `SimClock` instead of the wall clock
#[derive(Clone, Debug)]
pub struct SimTimer {
    clock: SimClock,
    state: SimState,
}

#[derive(Clone, Copy, Debug)]
enum SimState {
    Idle,
    Running(Duration),
    Stopped(Duration),
}

impl Timer for SimTimer {
    fn start(&mut self) {
        self.state = SimState::Running(self.clock.now());
    }

    fn stop(&mut self) {
        if let SimState::Running(t0) = self.state {
            self.state = SimState::Stopped(self.clock.now().saturating_sub(t0));
        }
    }

    fn elapsed(&self) -> Duration {
        match self.state {
            SimState::Idle => Duration::ZERO,
            SimState::Running(t0) => self.clock.now().saturating_sub(t0),
            SimState::Stopped(dt) => dt,
        }
    }

    fn reset(&mut self) {
        self.state = SimState::Idle;
    }
}
