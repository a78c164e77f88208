//! Unicycle ↔ differential-drive kinematics
//!
//! Pure conversions between a body velocity command (linear v, angular
//! omega) and per-wheel angular velocities, given wheel radius and track
//! width. Exact inverses of each other for nonzero radius and track;
//! callers validate those at drive-model construction.

/// Convert a unicycle command to (left, right) wheel angular velocities
/// in rad/s.
pub fn uni_to_diff(v: f32, omega: f32, wheel_radius: f32, wheel_track: f32) -> (f32, f32) {
    let v_left = (v - (wheel_track / 2.0) * omega) / wheel_radius;
    let v_right = (v + (wheel_track / 2.0) * omega) / wheel_radius;
    (v_left, v_right)
}

/// Convert (left, right) wheel angular velocities in rad/s back to a
/// unicycle (v, omega) command.
pub fn diff_to_uni(v_left: f32, v_right: f32, wheel_radius: f32, wheel_track: f32) -> (f32, f32) {
    let v = (wheel_radius / 2.0) * (v_right + v_left);
    let omega = (wheel_radius / wheel_track) * (v_right - v_left);
    (v, omega)
}
