//! PID control primitive
//!
//! One instance per controlled axis. Controllers construct and seed a PID
//! at activation and drop it at deactivation, so no state leaks between
//! controller lifetimes.

use std::thread;
use std::time::{Duration, Instant};

/// Proportional-integral-derivative controller over a scalar error.
///
/// `update` samples the wall clock for the integration step; the
/// time-free [`step`](Pid::step) runs the same arithmetic with an
/// explicit delta and is fully deterministic.
#[derive(Debug, Clone)]
pub struct Pid {
    kp: f32,
    ki: f32,
    kd: f32,

    /// Symmetric accumulator bound; unbounded when absent
    integral_limit: Option<f32>,

    integral: f32,
    prev_error: f32,
    prev_time: Option<Instant>,
}

impl Pid {
    /// Create a controller with the given gains. All terms start at zero;
    /// call [`initialize`](Pid::initialize) before the first update.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_limit: None,
            integral: 0.0,
            prev_error: 0.0,
            prev_time: None,
        }
    }

    /// Bound the integral accumulator to `[-limit, +limit]`. Callers with
    /// a nonzero integral gain size the limit as `max_output / ki` so the
    /// integral contribution alone can span the output range but no
    /// further; any in-range `initialize` seed stays untouched.
    pub fn with_integral_limit(mut self, limit: f32) -> Self {
        self.integral_limit = Some(limit.abs());
        self
    }

    /// Reset timing and error memory, seeding the integral term so that
    /// the first zero-error update reproduces `offset` (requires a
    /// positive integral gain; otherwise the seed is zero).
    pub fn initialize(&mut self, offset: f32) {
        self.prev_time = Some(Instant::now());
        self.prev_error = 0.0;
        self.integral = if self.ki > 0.0 { offset / self.ki } else { 0.0 };
    }

    /// Update from a new error sample, measuring elapsed time since the
    /// previous sample on the wall clock.
    pub fn update(&mut self, error: f32) -> f32 {
        let now = Instant::now();
        let delta_time = match self.prev_time {
            Some(prev) => (now - prev).as_secs_f32(),
            None => 0.0,
        };
        self.prev_time = Some(now);
        self.step(error, delta_time)
    }

    /// Sleep for `delay`, then update. For callers that pace their own
    /// sample rate; the elapsed time still comes from the wall clock, so
    /// scheduling overshoot is integrated rather than lost.
    pub fn update_after(&mut self, error: f32, delay: Duration) -> f32 {
        thread::sleep(delay);
        self.update(error)
    }

    /// The time-free update core: accumulate the integral, form the
    /// derivative (zero when `delta_time` is not positive, which guards
    /// the first sample), and combine the three terms.
    pub fn step(&mut self, error: f32, delta_time: f32) -> f32 {
        let delta_error = error - self.prev_error;

        self.integral += error * delta_time;
        if let Some(limit) = self.integral_limit {
            self.integral = self.integral.clamp(-limit, limit);
        }

        let derivative = if delta_time > 0.0 {
            delta_error / delta_time
        } else {
            0.0
        };

        self.prev_error = error;

        self.kp * error + self.ki * self.integral + self.kd * derivative
    }
}
