//! Drive actuation: body velocity command → four wheel actuators

use super::kinematics::uni_to_diff;
use crate::config::AppConfig;
use crate::devices::WheelActuator;
use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Per-wheel actuator command range, in signed speed percent
pub const WHEEL_COMMAND_LIMIT: f32 = 100.0;

/// Fixed drive geometry and calibration
#[derive(Debug, Clone, Copy)]
pub struct DriveModel {
    wheel_radius: f32,
    wheel_track: f32,

    /// Empirical gain mapping wheel rad/s to actuator command units
    gain: f32,
}

impl DriveModel {
    /// Create a drive model, rejecting degenerate geometry here so the
    /// per-cycle kinematics never divide by zero.
    pub fn new(wheel_radius: f32, wheel_track: f32, gain: f32) -> Result<Self> {
        if wheel_radius <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "wheel_radius must be positive, got {}",
                wheel_radius
            )));
        }
        if wheel_track <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "wheel_track must be positive, got {}",
                wheel_track
            )));
        }

        Ok(Self {
            wheel_radius,
            wheel_track,
            gain,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.robot.wheel_radius,
            config.robot.wheel_track,
            config.drive.gain,
        )
    }

    /// (left, right) wheel angular velocities in rad/s for a body command
    pub fn wheel_speeds(&self, v: f32, omega: f32) -> (f32, f32) {
        uni_to_diff(v, omega, self.wheel_radius, self.wheel_track)
    }

    /// (left, right) actuator commands for a body command, scaled by the
    /// calibration gain and clamped to the actuator range
    pub fn wheel_commands(&self, v: f32, omega: f32) -> (f32, f32) {
        let (left, right) = self.wheel_speeds(v, omega);
        (
            (left * self.gain).clamp(-WHEEL_COMMAND_LIMIT, WHEEL_COMMAND_LIMIT),
            (right * self.gain).clamp(-WHEEL_COMMAND_LIMIT, WHEEL_COMMAND_LIMIT),
        )
    }
}

/// Four-wheel differential drive. Front and back wheels on the same side
/// always receive the same command; there is no per-wheel slip
/// compensation.
pub struct FourWheelDrive {
    model: DriveModel,
    left_front: Box<dyn WheelActuator>,
    right_front: Box<dyn WheelActuator>,
    left_back: Box<dyn WheelActuator>,
    right_back: Box<dyn WheelActuator>,

    /// Last dispatch log time (for throttling)
    last_dispatch_log: Option<Instant>,
}

impl FourWheelDrive {
    pub fn new(
        model: DriveModel,
        left_front: Box<dyn WheelActuator>,
        right_front: Box<dyn WheelActuator>,
        left_back: Box<dyn WheelActuator>,
        right_back: Box<dyn WheelActuator>,
    ) -> Self {
        Self {
            model,
            left_front,
            right_front,
            left_back,
            right_back,
            last_dispatch_log: None,
        }
    }

    pub fn model(&self) -> &DriveModel {
        &self.model
    }

    /// Convert the body command to wheel commands and dispatch to all
    /// four actuators.
    pub fn update(&mut self, v: f32, omega: f32) -> Result<()> {
        let (left, right) = self.model.wheel_commands(v, omega);

        let should_log = match self.last_dispatch_log {
            Some(last) => last.elapsed() >= Duration::from_secs(1),
            None => true,
        };
        if should_log && (left.abs() > 0.01 || right.abs() > 0.01) {
            log::debug!(
                "Drive: v={:.3}m/s omega={:.3}rad/s -> wheels ({:.1}, {:.1})",
                v,
                omega,
                left,
                right
            );
            self.last_dispatch_log = Some(Instant::now());
        }

        self.left_front.run(left)?;
        self.left_back.run(left)?;
        self.right_front.run(right)?;
        self.right_back.run(right)?;
        Ok(())
    }

    /// Send zero to all four actuators. A faulted actuator does not
    /// block the release of the others; every wheel is attempted and
    /// the failures are reported together.
    pub fn stop(&mut self) -> Result<()> {
        let mut failures = Vec::new();
        for (name, wheel) in [
            ("left front", &mut self.left_front),
            ("left back", &mut self.left_back),
            ("right front", &mut self.right_front),
            ("right back", &mut self.right_back),
        ] {
            if let Err(e) = wheel.run(0.0) {
                failures.push(format!("{}: {}", name, e));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Hardware(format!(
                "stop failed on {}",
                failures.join("; ")
            )))
        }
    }
}
