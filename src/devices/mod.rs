//! Device abstractions and backend selection

pub mod mock;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::status::StatusSink;
use crate::vision::{Camera, Detector};
use std::sync::Arc;

/// A single wheel actuator. Speed is a signed percentage of full speed;
/// implementations must accept the whole [-100, 100] range.
pub trait WheelActuator: Send {
    fn run(&mut self, speed: f32) -> Result<()>;
}

/// A positional servo output. Angles are hardware degrees within the
/// servo's actuation range; centering and safety limits are applied by
/// the caller before commands reach this trait.
pub trait ServoSink: Send {
    fn set_angle(&mut self, degrees: f32) -> Result<()>;
}

/// The complete device set a robot is assembled from
pub struct HardwareRig {
    pub left_front: Box<dyn WheelActuator>,
    pub right_front: Box<dyn WheelActuator>,
    pub left_back: Box<dyn WheelActuator>,
    pub right_back: Box<dyn WheelActuator>,
    pub pan_servo: Box<dyn ServoSink>,
    pub tilt_servo: Box<dyn ServoSink>,
    pub camera: Box<dyn Camera>,
    pub object_detector: Arc<dyn Detector>,
    pub face_detector: Arc<dyn Detector>,
    pub status_sink: Box<dyn StatusSink>,
}

/// Create a hardware rig based on configuration
pub fn create_rig(config: &AppConfig) -> Result<HardwareRig> {
    match config.hardware.device_type.as_str() {
        "mock" => {
            let (rig, _) = mock::mock_rig(config)?;
            Ok(rig)
        }
        _ => Err(Error::UnknownDevice(config.hardware.device_type.clone())),
    }
}
