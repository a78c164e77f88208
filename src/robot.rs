//! Robot assembly: drive, pan/tilt mount, camera, and status display
//! behind one facade

use crate::config::{AppConfig, ServoConfig};
use crate::devices::{HardwareRig, ServoSink, create_rig};
use crate::error::{Error, Result};
use crate::motion::{DriveModel, FourWheelDrive};
use crate::shared::RobotState;
use crate::status::{StatusReport, StatusSink};
use crate::vision::{Camera, Frame, Perception};

/// One servo output with centering, safety limits, and optional inversion.
///
/// Callers command logical degrees where 0 is the centered position;
/// hardware angles are offset by half the actuation range before the
/// safe-limit clamp.
pub struct ServoChannel {
    sink: Box<dyn ServoSink>,
    half_range: f32,
    min_angle: f32,
    max_angle: f32,
    inverted: bool,
}

impl ServoChannel {
    pub fn new(config: &ServoConfig, sink: Box<dyn ServoSink>) -> Self {
        Self {
            sink,
            half_range: config.actuation_range / 2.0,
            min_angle: config.min_angle,
            max_angle: config.max_angle,
            inverted: config.inverted,
        }
    }

    pub fn set_angle(&mut self, degrees: f32) -> Result<()> {
        let signed = if self.inverted { -degrees } else { degrees };
        let hardware = (signed + self.half_range).clamp(self.min_angle, self.max_angle);
        self.sink.set_angle(hardware)
    }
}

/// Two-axis camera mount
pub struct PanTiltMount {
    pan: ServoChannel,
    tilt: ServoChannel,
}

impl PanTiltMount {
    pub fn new(pan: ServoChannel, tilt: ServoChannel) -> Self {
        Self { pan, tilt }
    }

    pub fn pan(&mut self, degrees: f32) -> Result<()> {
        self.pan.set_angle(degrees)
    }

    pub fn tilt(&mut self, degrees: f32) -> Result<()> {
        self.tilt.set_angle(degrees)
    }

    /// Center both axes. A faulted axis does not block the other;
    /// failures are reported together.
    pub fn park(&mut self) -> Result<()> {
        let mut failures = Vec::new();
        if let Err(e) = self.pan.set_angle(0.0) {
            failures.push(format!("pan: {}", e));
        }
        if let Err(e) = self.tilt.set_angle(0.0) {
            failures.push(format!("tilt: {}", e));
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Hardware(format!(
                "park failed on {}",
                failures.join("; ")
            )))
        }
    }
}

/// The physical robot: every actuator and sensor behind one facade.
///
/// Controllers never touch this directly; they write desired state into
/// [`SharedState`](crate::shared::SharedState) and the supervisor applies
/// a snapshot here once per cycle.
pub struct Robot {
    drive: FourWheelDrive,
    mount: PanTiltMount,
    camera: Box<dyn Camera>,
    status_sink: Box<dyn StatusSink>,
    shut_down: bool,
}

impl Robot {
    /// Assemble a robot from an already-created hardware rig. Also
    /// returns the perception stack, which runs independently of the
    /// actuator facade.
    pub fn from_rig(config: &AppConfig, rig: HardwareRig) -> Result<(Self, Perception)> {
        let model = DriveModel::from_config(config)?;
        let drive = FourWheelDrive::new(
            model,
            rig.left_front,
            rig.right_front,
            rig.left_back,
            rig.right_back,
        );
        let mount = PanTiltMount::new(
            ServoChannel::new(&config.pan_servo, rig.pan_servo),
            ServoChannel::new(&config.tilt_servo, rig.tilt_servo),
        );

        let robot = Self {
            drive,
            mount,
            camera: rig.camera,
            status_sink: rig.status_sink,
            shut_down: false,
        };
        let perception = Perception {
            object_detector: rig.object_detector,
            face_detector: rig.face_detector,
        };
        Ok((robot, perception))
    }

    /// Dispatch a desired-state snapshot to the actuators
    pub fn apply(&mut self, state: RobotState) -> Result<()> {
        self.mount.pan(state.pan)?;
        self.mount.tilt(state.tilt)?;
        self.drive.update(state.v, state.omega)?;
        Ok(())
    }

    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        self.camera.read_frame()
    }

    pub fn camera_open(&self) -> bool {
        self.camera.is_open()
    }

    pub fn publish_status(&mut self, report: &StatusReport) -> Result<()> {
        self.status_sink.publish(report)
    }

    /// Stop the wheels, park the mount, and release the camera.
    /// Idempotent; also runs on drop so the robot never outlives its
    /// process still moving.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        if let Err(e) = self.drive.stop() {
            log::warn!("Robot: drive stop failed during shutdown: {}", e);
        }
        if let Err(e) = self.mount.park() {
            log::warn!("Robot: mount park failed during shutdown: {}", e);
        }
        self.camera.release();
        self.shut_down = true;
        log::info!("Robot: shut down");
    }
}

impl Drop for Robot {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Create the configured robot and its perception stack
pub fn create_robot(config: &AppConfig) -> Result<(Robot, Perception)> {
    let rig = create_rig(config)?;
    Robot::from_rig(config, rig)
}
