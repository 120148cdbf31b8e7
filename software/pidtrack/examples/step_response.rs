//! Step response of a PI loop around a simulated first-order process.
//!
//! Demonstrated here:
//!   * Loading a controller config (pass a JSON file path as the first argument)
//!   * Driving the controller from a simulated clock
//!   * Capturing the settling report alongside the default log output
//!
//! Run with `cargo run --example step_response [config.json]`.

use std::sync::{Arc, Mutex};

use pidtrack::logging::{default_run_name, init_logging};
use pidtrack::plant::FirstOrderPlant;
use pidtrack::*;
use tracing::warn;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (_, _guards) = init_logging(None, &default_run_name())?;

    // Underdamped PI tuning so there is some overshoot to measure
    let cfg = match std::env::args().nth(1) {
        Some(path) => PidConfig::from_json_file(path)?,
        None => PidConfig::new(1.0, 10.0, 0.0).with_output_limits(0.0, 100.0),
    };
    println!("{}", cfg.to_json()?);

    let clock = SimClock::new();
    let report = Arc::new(Mutex::new(None));
    let sink = report.clone();
    let mut controller = Controller::with_timers(&cfg, clock.timer(), clock.timer())
        .with_observer(move |m: &StepMetrics| {
            if let Err(e) = LogObserver.report(m) {
                warn!("Failed to log step metrics: {e}");
            }
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(*m);
            }
        });

    let mut plant = FirstOrderPlant::new(1.0, 1.0, 0.0);
    let dt_s = 0.001; // 1 kHz
    let mut y = plant.output();

    controller.target_setpoint(10.0);
    for i in 0..10_000 {
        clock.advance_secs(dt_s);
        let u = controller.calc(y);
        y = plant.step(u, dt_s);
        if i % 500 == 0 {
            println!("t = {:6.3} s  u = {u:8.3}  y = {y:8.3}", clock.now().as_secs_f64());
        }
    }

    let settled = report.lock().map(|r| *r).unwrap_or(None);
    match settled {
        Some(m) => println!(
            "peak time {:?}, overshoot {:.2}%, settling time {:?}",
            m.peak_time,
            m.percent_overshoot(),
            m.settling_time
        ),
        None => println!("did not settle within {:.1} s", clock.now().as_secs_f64()),
    }

    Ok(())
}
