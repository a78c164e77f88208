//! Motion primitives: PID regulation, differential-drive kinematics, and
//! wheel actuation.

pub mod drive;
pub mod kinematics;
pub mod pid;

pub use drive::{DriveModel, FourWheelDrive, WHEEL_COMMAND_LIMIT};
pub use kinematics::{diff_to_uni, uni_to_diff};
pub use pid::Pid;
