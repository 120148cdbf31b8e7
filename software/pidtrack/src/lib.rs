//! Discrete-time PID control with step-response performance tracking.

pub mod config;
pub mod controller;
pub mod logging;
pub mod plant;
pub mod timer;

pub use config::{ConfigError, PidConfig};
pub use controller::{Controller, Limits, LogObserver, MetricsObserver, StepMetrics, limiter};
pub use timer::{SimClock, SimTimer, Stopwatch, Timer};
