//! Servo-only target following

use super::{ControlContext, PAN_GAINS, SERVO_LIMIT_DEG, TILT_GAINS, threshold_for};
use crate::error::Result;
use crate::motion::Pid;
use crate::shared::SharedState;
use crate::vision::{Detector, Perception, select_target};
use std::sync::Arc;

/// Keeps the detected target centered in the frame by steering the
/// pan/tilt mount. The drive stays untouched; this controller never
/// writes `v` or `omega`.
pub struct PanTiltController {
    detector: Arc<dyn Detector>,
    threshold: f32,
    pan_pid: Pid,
    tilt_pid: Pid,
}

impl PanTiltController {
    /// The detector and threshold are fixed by the target in effect at
    /// activation; both PIDs are seeded with the current mount angles so
    /// the first update does not jerk the servos.
    pub fn new(shared: &SharedState, perception: &Perception, target: &str) -> Self {
        let mut pan_pid = Pid::new(PAN_GAINS.0, PAN_GAINS.1, PAN_GAINS.2)
            .with_integral_limit(SERVO_LIMIT_DEG / PAN_GAINS.1);
        pan_pid.initialize(shared.pan());

        let mut tilt_pid = Pid::new(TILT_GAINS.0, TILT_GAINS.1, TILT_GAINS.2)
            .with_integral_limit(SERVO_LIMIT_DEG / TILT_GAINS.1);
        tilt_pid.initialize(shared.tilt());

        Self {
            detector: perception.detector_for(target),
            threshold: threshold_for(target),
            pan_pid,
            tilt_pid,
        }
    }

    /// One following step. Without a frame this cycle is a no-op; with a
    /// frame but no matching detection both axes settle on zero error.
    pub fn update(&mut self, ctx: &ControlContext<'_>) -> Result<()> {
        let Some(frame) = ctx.frame else {
            return Ok(());
        };

        let detections = self.detector.detect(frame, self.threshold)?;
        match select_target(&detections, self.detector.as_ref(), ctx.target) {
            Some(hit) => {
                let (center_x, center_y) = frame.center();
                let pan_error = center_x - hit.bbox.center_x();
                ctx.shared.set_pan(self.pan_pid.update(pan_error));
                let tilt_error = center_y - hit.bbox.center_y();
                ctx.shared.set_tilt(self.tilt_pid.update(tilt_error));
            }
            None => {
                ctx.shared.set_pan(self.pan_pid.update(0.0));
                ctx.shared.set_tilt(self.tilt_pid.update(0.0));
            }
        }
        Ok(())
    }
}
