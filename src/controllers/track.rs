//! Drive-and-follow controller

use super::{ControlContext, SERVO_LIMIT_DEG, TILT_GAINS, TURN_GAINS};
use crate::config::AppConfig;
use crate::error::Result;
use crate::motion::Pid;
use crate::shared::SharedState;
use crate::vision::{Detector, FACE_TARGET, Perception, select_target};
use std::sync::Arc;

/// Per-target tuning fixed at activation
#[derive(Clone, Copy, Debug)]
struct TargetProfile {
    /// Minimum detection score
    threshold: f32,

    /// Fraction of the frame area the target's box should occupy when
    /// the robot has closed to the right distance
    goal_size: f32,

    /// Tilt angle written into the shared state at activation, for
    /// targets whose expected height is known
    tilt_preset: Option<f32>,
}

impl TargetProfile {
    fn for_target(target: &str) -> Self {
        match target {
            FACE_TARGET => Self {
                threshold: 0.1,
                goal_size: 0.15,
                tilt_preset: Some(45.0),
            },
            "person" => Self {
                threshold: 0.6,
                goal_size: 0.75,
                tilt_preset: Some(30.0),
            },
            _ => Self {
                threshold: 0.4,
                goal_size: 0.3,
                tilt_preset: None,
            },
        }
    }
}

/// Follows the target with the whole robot: turning steers the body
/// toward the target, tilt keeps it in frame vertically, and forward
/// speed closes the distance until the target's box reaches its goal
/// size.
pub struct TrackController {
    detector: Arc<dyn Detector>,
    profile: TargetProfile,
    max_linear: f32,
    turn_pid: Pid,
    tilt_pid: Pid,
}

impl TrackController {
    pub fn new(
        shared: &SharedState,
        perception: &Perception,
        config: &AppConfig,
        target: &str,
    ) -> Self {
        let profile = TargetProfile::for_target(target);
        if let Some(tilt) = profile.tilt_preset {
            shared.set_tilt(tilt);
        }

        let mut turn_pid = Pid::new(TURN_GAINS.0, TURN_GAINS.1, TURN_GAINS.2);
        turn_pid.initialize(shared.velocity().1);

        // seeded after the preset so the axis does not fight it
        let mut tilt_pid = Pid::new(TILT_GAINS.0, TILT_GAINS.1, TILT_GAINS.2)
            .with_integral_limit(SERVO_LIMIT_DEG / TILT_GAINS.1);
        tilt_pid.initialize(shared.tilt());

        Self {
            detector: perception.detector_for(target),
            profile,
            max_linear: config.drive.max_linear_velocity,
            turn_pid,
            tilt_pid,
        }
    }

    pub fn update(&mut self, ctx: &ControlContext<'_>) -> Result<()> {
        let Some(frame) = ctx.frame else {
            return Ok(());
        };

        let detections = self.detector.detect(frame, self.profile.threshold)?;
        match select_target(&detections, self.detector.as_ref(), ctx.target) {
            Some(hit) => {
                let (center_x, center_y) = frame.center();

                let turn_error = center_x - hit.bbox.center_x();
                let omega = self.turn_pid.update(turn_error);

                let tilt_error = center_y - hit.bbox.center_y();
                ctx.shared.set_tilt(self.tilt_pid.update(tilt_error));

                // Forward speed shrinks as the box approaches goal size,
                // damped by turn rate so sharp turns stay slow.
                let goal_area = frame.area() * self.profile.goal_size;
                let drive_error = 1.0 - (hit.bbox.area() / goal_area).min(1.0);
                let v = drive_error * self.max_linear / (omega.abs() + 1.0).sqrt();
                ctx.shared.set_velocity(v, omega);
            }
            None => {
                let omega = self.turn_pid.update(0.0);
                ctx.shared.set_tilt(self.tilt_pid.update(0.0));
                ctx.shared.set_velocity(0.0, omega);
            }
        }
        Ok(())
    }
}
