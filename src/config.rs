//! Configuration loading for DrishtiBot

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default = "default_pan_servo")]
    pub pan_servo: ServoConfig,
    #[serde(default = "default_tilt_servo")]
    pub tilt_servo: ServoConfig,
    #[serde(default)]
    pub find: FindConfig,
}

/// Robot physical parameters
#[derive(Clone, Debug, Deserialize)]
pub struct RobotConfig {
    /// Wheel radius in meters (default: 0.033)
    #[serde(default = "default_wheel_radius")]
    pub wheel_radius: f32,

    /// Distance between left and right wheels in meters (default: 0.136)
    #[serde(default = "default_wheel_track")]
    pub wheel_track: f32,
}

/// Drive actuation parameters
#[derive(Clone, Debug, Deserialize)]
pub struct DriveConfig {
    /// Empirical gain from wheel rad/s to actuator command units (default: 8.86)
    #[serde(default = "default_drive_gain")]
    pub gain: f32,

    /// Maximum commanded linear velocity in m/s (default: 0.4)
    #[serde(default = "default_max_linear")]
    pub max_linear_velocity: f32,
}

/// Camera capture settings
#[derive(Clone, Debug, Deserialize)]
pub struct CameraConfig {
    /// Camera device index (default: 0)
    #[serde(default = "default_camera_index")]
    pub index: u32,

    /// Frame width in pixels (default: 640)
    #[serde(default = "default_frame_width")]
    pub width: u32,

    /// Frame height in pixels (default: 480)
    #[serde(default = "default_frame_height")]
    pub height: u32,

    /// Frame rate in Hz (default: 30.0)
    #[serde(default = "default_camera_fps")]
    pub fps: f32,
}

/// Hardware backend selection
#[derive(Clone, Debug, Deserialize)]
pub struct HardwareConfig {
    /// Device backend: "mock" is the only in-tree implementation
    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// Seed for the mock rig's simulated target (0 = random entropy)
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
}

/// One servo channel of the pan/tilt mount
#[derive(Clone, Debug, Deserialize)]
pub struct ServoConfig {
    /// Servo channel index on the controller board
    #[serde(default = "default_servo_channel")]
    pub channel: u8,

    /// Full actuation range in degrees; commands are offset by half of it
    /// so that 0° addresses the center position
    #[serde(default = "default_actuation_range")]
    pub actuation_range: f32,

    /// Lower hardware-safe limit in degrees, after the center offset
    #[serde(default = "default_servo_min")]
    pub min_angle: f32,

    /// Upper hardware-safe limit in degrees, after the center offset
    #[serde(default = "default_servo_max")]
    pub max_angle: f32,

    /// Negate commanded angles for mirrored mounting
    #[serde(default)]
    pub inverted: bool,
}

/// Find-controller scan settings
#[derive(Clone, Debug, Deserialize)]
pub struct FindConfig {
    /// Sweep strategy while searching for the target
    #[serde(default)]
    pub method: ScanMethod,

    /// Angular speed of the in-place rotation sweep in rad/s (default: 1.5)
    #[serde(default = "default_scan_speed")]
    pub scan_speed: f32,

    /// Dwell per pan/tilt sweep step in seconds (default: 0.5)
    #[serde(default = "default_sweep_step")]
    pub sweep_step_secs: f32,

    /// Cancellation/detection poll interval in milliseconds (default: 50)
    #[serde(default = "default_scan_poll")]
    pub poll_interval_ms: u64,
}

/// How the Find controller sweeps for a target
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanMethod {
    /// Rotate the robot in place, full 360° turns
    #[default]
    Drive,
    /// Hold position and sweep the pan/tilt servos row by row
    PanTilt,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            wheel_radius: default_wheel_radius(),
            wheel_track: default_wheel_track(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            gain: default_drive_gain(),
            max_linear_velocity: default_max_linear(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: default_camera_index(),
            width: default_frame_width(),
            height: default_frame_height(),
            fps: default_camera_fps(),
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            random_seed: default_random_seed(),
        }
    }
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            method: ScanMethod::default(),
            scan_speed: default_scan_speed(),
            sweep_step_secs: default_sweep_step(),
            poll_interval_ms: default_scan_poll(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            robot: RobotConfig::default(),
            drive: DriveConfig::default(),
            camera: CameraConfig::default(),
            hardware: HardwareConfig::default(),
            pan_servo: default_pan_servo(),
            tilt_servo: default_tilt_servo(),
            find: FindConfig::default(),
        }
    }
}

// Default value functions
fn default_wheel_radius() -> f32 {
    0.033
}
fn default_wheel_track() -> f32 {
    0.136
}
// 4.43 per motor pair, doubled during calibration
fn default_drive_gain() -> f32 {
    8.86
}
fn default_max_linear() -> f32 {
    0.4
}
fn default_camera_index() -> u32 {
    0
}
fn default_frame_width() -> u32 {
    640
}
fn default_frame_height() -> u32 {
    480
}
fn default_camera_fps() -> f32 {
    30.0
}
fn default_device_type() -> String {
    "mock".to_string()
}
fn default_random_seed() -> u64 {
    0
}
fn default_servo_channel() -> u8 {
    0
}
fn default_actuation_range() -> f32 {
    180.0
}
fn default_servo_min() -> f32 {
    0.0
}
fn default_servo_max() -> f32 {
    180.0
}
fn default_scan_speed() -> f32 {
    1.5
}
fn default_sweep_step() -> f32 {
    0.5
}
fn default_scan_poll() -> u64 {
    50
}

/// Pan servo: channel 0, full 0°..180° travel
fn default_pan_servo() -> ServoConfig {
    ServoConfig {
        channel: 0,
        actuation_range: default_actuation_range(),
        min_angle: 0.0,
        max_angle: 180.0,
        inverted: false,
    }
}

/// Tilt servo: channel 1, limited to 30°..150° to avoid overextension,
/// mounted mirrored
fn default_tilt_servo() -> ServoConfig {
    ServoConfig {
        channel: 1,
        actuation_range: default_actuation_range(),
        min_angle: 30.0,
        max_angle: 150.0,
        inverted: true,
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
