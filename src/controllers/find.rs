//! Scan-until-found controller

use super::{ControlContext, threshold_for};
use crate::config::{FindConfig, ScanMethod};
use crate::error::{Error, Result};
use crate::shared::SharedState;
use crate::vision::{Detector, Perception, select_target};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Sweeps the environment on a background thread until a frame yields a
/// qualifying detection of the target.
///
/// `update` only runs the detector and latches the detection flag; all
/// sustained motion lives on the scan thread so the control loop never
/// blocks. The flag is sticky for this controller's lifetime, and the
/// supervisor reads it to hand off to Track.
pub struct FindController {
    detector: Arc<dyn Detector>,
    threshold: f32,
    detection: Arc<AtomicBool>,
    scan: Option<ScanTask>,
}

struct ScanTask {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Everything a sweep needs to run and to know when to stop
struct ScanParams {
    shared: Arc<SharedState>,
    detection: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    poll: Duration,
}

impl ScanParams {
    fn done(&self) -> bool {
        self.cancel.load(Ordering::Relaxed) || self.detection.load(Ordering::Relaxed)
    }
}

impl FindController {
    pub fn new(
        shared: Arc<SharedState>,
        perception: &Perception,
        config: &FindConfig,
        target: &str,
    ) -> Result<Self> {
        let detection = Arc::new(AtomicBool::new(false));
        let cancel = Arc::new(AtomicBool::new(false));

        let params = ScanParams {
            shared,
            detection: Arc::clone(&detection),
            cancel: Arc::clone(&cancel),
            poll: Duration::from_millis(config.poll_interval_ms),
        };
        let method = config.method;
        let scan_speed = config.scan_speed;
        let dwell = Duration::from_secs_f32(config.sweep_step_secs);

        let handle = thread::Builder::new()
            .name("find-scan".to_string())
            .spawn(move || match method {
                ScanMethod::Drive => scan_drive(params, scan_speed),
                ScanMethod::PanTilt => scan_pan_tilt(params, dwell),
            })
            .map_err(|e| Error::Thread(format!("Failed to spawn scan thread: {}", e)))?;

        Ok(Self {
            detector: perception.detector_for(target),
            threshold: threshold_for(target),
            detection,
            scan: Some(ScanTask { cancel, handle }),
        })
    }

    /// Whether any frame so far yielded a qualifying detection
    pub fn detection_set(&self) -> bool {
        self.detection.load(Ordering::Relaxed)
    }

    /// Run detection on the cycle's frame; the first qualifying hit
    /// latches the flag and halts the scan.
    pub fn update(&mut self, ctx: &ControlContext<'_>) -> Result<()> {
        let Some(frame) = ctx.frame else {
            return Ok(());
        };

        let detections = self.detector.detect(frame, self.threshold)?;
        if select_target(&detections, self.detector.as_ref(), ctx.target).is_some()
            && !self.detection.swap(true, Ordering::Relaxed)
        {
            log::info!("FindController: target '{}' detected", ctx.target);
        }
        Ok(())
    }

    /// Cancel the scan thread and wait for it to zero the velocity and
    /// exit. Idempotent.
    pub fn stop_scan(&mut self) {
        if let Some(task) = self.scan.take() {
            task.cancel.store(true, Ordering::Relaxed);
            if task.handle.join().is_err() {
                log::warn!("FindController: scan thread panicked");
            }
        }
    }
}

impl Drop for FindController {
    fn drop(&mut self) {
        self.stop_scan();
    }
}

/// Rotate in place, tilt level, until cancelled or the target is seen.
/// The velocity fields are zeroed on every exit path.
fn scan_drive(params: ScanParams, scan_speed: f32) {
    log::debug!("FindController: drive scan at {:.2} rad/s", scan_speed);
    params.shared.set_tilt(0.0);
    params.shared.set_velocity(0.0, scan_speed);

    while !params.done() {
        thread::sleep(params.poll);
    }

    params.shared.stop_motion();
    log::debug!("FindController: drive scan stopped");
}

/// Boustrophedon servo sweep: hold the robot still and walk the pan
/// range at each tilt row, reversing direction every pass.
fn scan_pan_tilt(params: ScanParams, dwell: Duration) {
    let mut tilt_angles: Vec<f32> = vec![0.0, 30.0];
    let mut pan_angles: Vec<f32> = (-3..=3).map(|i| i as f32 * 30.0).collect();

    log::debug!("FindController: pan/tilt scan, {:?} per step", dwell);
    'sweep: loop {
        for &tilt in &tilt_angles {
            if params.done() {
                break 'sweep;
            }
            params.shared.set_tilt(tilt);

            for &pan in &pan_angles {
                if !dwell_poll(&params, dwell) {
                    break 'sweep;
                }
                params.shared.set_pan(pan);
            }
            pan_angles.reverse();
        }
        tilt_angles.reverse();
    }

    params.shared.stop_motion();
    log::debug!("FindController: pan/tilt scan stopped");
}

/// Wait out one dwell period in poll-sized slices. Returns false as soon
/// as the scan should exit.
fn dwell_poll(params: &ScanParams, dwell: Duration) -> bool {
    let deadline = Instant::now() + dwell;
    loop {
        if params.done() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(params.poll.min(deadline - now));
    }
}
