//! Controller strategies
//!
//! One controller is active at a time; the supervisor activates them,
//! calls `update` once per cycle, and deactivates them on command
//! changes. Controllers write desired motion into the shared state and
//! never touch hardware.

mod drive_test;
mod find;
mod pan_tilt;
mod standby;
mod track;

pub use drive_test::DriveTestController;
pub use find::FindController;
pub use pan_tilt::PanTiltController;
pub use standby::StandbyController;
pub use track::TrackController;

use crate::config::AppConfig;
use crate::error::Result;
use crate::shared::SharedState;
use crate::vision::{FACE_TARGET, Frame, Perception};
use std::fmt;
use std::sync::Arc;

// PID gains carried over from hand calibration on the physical robot.
/// Pan axis (kp, ki, kd)
const PAN_GAINS: (f32, f32, f32) = (0.035, 0.0004, 0.0001);
/// Tilt axis, shared by PanTilt and Track
const TILT_GAINS: (f32, f32, f32) = (0.06, 0.0006, 0.0002);
/// Body turn rate for Track, pure proportional
const TURN_GAINS: (f32, f32, f32) = (0.003, 0.0, 0.0);

/// Servo PIDs output degrees bounded by half the actuation range; their
/// integral limits are sized so the integral term alone cannot exceed it.
const SERVO_LIMIT_DEG: f32 = 90.0;

/// Detection threshold for the dedicated face model. The face model is
/// noisy, so it runs permissive.
const FACE_THRESHOLD: f32 = 0.1;
/// Detection threshold for general object classes
const OBJECT_THRESHOLD: f32 = 0.4;

fn threshold_for(target: &str) -> f32 {
    if target == FACE_TARGET {
        FACE_THRESHOLD
    } else {
        OBJECT_THRESHOLD
    }
}

/// Which controller strategy is active
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerKind {
    Standby,
    PanTilt,
    Track,
    Find,
    DriveTest,
}

impl ControllerKind {
    /// Display name used in status output
    pub fn name(self) -> &'static str {
        match self {
            ControllerKind::Standby => "Standby",
            ControllerKind::PanTilt => "Pan Tilt",
            ControllerKind::Track => "Track",
            ControllerKind::Find => "Find Object",
            ControllerKind::DriveTest => "Drive Test",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-cycle input handed to the active controller
pub struct ControlContext<'a> {
    pub shared: &'a SharedState,

    /// The cycle's camera frame; `None` degrades vision-dependent
    /// controllers to a no-op for the cycle
    pub frame: Option<&'a Frame>,

    /// Target object in effect this cycle (label filtering uses the live
    /// value; detector choice and thresholds were fixed at activation)
    pub target: &'a str,
}

/// The active controller. Enum dispatch keeps the supervisor loop free
/// of virtual calls and makes the deactivation path exhaustive.
pub enum ActiveController {
    Standby(StandbyController),
    PanTilt(PanTiltController),
    Track(TrackController),
    Find(FindController),
    DriveTest(DriveTestController),
}

impl ActiveController {
    /// Construct and start the controller for a kind
    pub fn activate(
        kind: ControllerKind,
        shared: &Arc<SharedState>,
        perception: &Perception,
        config: &AppConfig,
        target: &str,
    ) -> Result<Self> {
        Ok(match kind {
            ControllerKind::Standby => ActiveController::Standby(StandbyController::new()),
            ControllerKind::PanTilt => {
                ActiveController::PanTilt(PanTiltController::new(shared, perception, target))
            }
            ControllerKind::Track => {
                ActiveController::Track(TrackController::new(shared, perception, config, target))
            }
            ControllerKind::Find => ActiveController::Find(FindController::new(
                Arc::clone(shared),
                perception,
                &config.find,
                target,
            )?),
            ControllerKind::DriveTest => ActiveController::DriveTest(DriveTestController::new()),
        })
    }

    pub fn kind(&self) -> ControllerKind {
        match self {
            ActiveController::Standby(_) => ControllerKind::Standby,
            ActiveController::PanTilt(_) => ControllerKind::PanTilt,
            ActiveController::Track(_) => ControllerKind::Track,
            ActiveController::Find(_) => ControllerKind::Find,
            ActiveController::DriveTest(_) => ControllerKind::DriveTest,
        }
    }

    pub fn update(&mut self, ctx: &ControlContext<'_>) -> Result<()> {
        match self {
            ActiveController::Standby(c) => c.update(ctx),
            ActiveController::PanTilt(c) => c.update(ctx),
            ActiveController::Track(c) => c.update(ctx),
            ActiveController::Find(c) => c.update(ctx),
            ActiveController::DriveTest(c) => c.update(ctx),
        }
    }

    /// Release controller resources and halt motion. Always zeroes
    /// `v`/`omega`, so a swapped-out controller can never leave the
    /// robot moving under a stale command.
    pub fn deactivate(&mut self, shared: &SharedState) {
        if let ActiveController::Find(find) = self {
            find.stop_scan();
        }
        shared.stop_motion();
    }

    /// Find's sticky detection flag; false for every other controller
    pub fn detection_set(&self) -> bool {
        match self {
            ActiveController::Find(find) => find.detection_set(),
            _ => false,
        }
    }
}
