//! DrishtiBot - Supervisory control for a vision-guided mobile robot
//!
//! This library provides the control core for a four-wheel differential
//! drive robot with a pan/tilt camera head: a command-driven supervisor,
//! swappable tracking/search controllers, PID-based servo and drive
//! control, and a mock hardware rig for development without the robot.

pub mod command;
pub mod config;
pub mod controllers;
pub mod devices;
pub mod error;
pub mod motion;
pub mod robot;
pub mod shared;
pub mod status;
pub mod supervisor;
pub mod vision;

// Re-export commonly used types
pub use command::Command;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use robot::{Robot, create_robot};
pub use shared::SharedState;
pub use supervisor::Supervisor;
