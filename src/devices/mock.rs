//! Mock hardware for camera-free development and testing
//!
//! Every actuator records what it was commanded so tests can assert on
//! outputs. The camera paces readers at the configured frame rate the way
//! real capture hardware would, and the detectors either replay scripted
//! scenes or synthesize a wandering target with seeded noise.

use super::{HardwareRig, ServoSink, WheelActuator};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::status::{StatusReport, StatusSink};
use crate::vision::{BoundingBox, Camera, Detection, Detector, Frame, label_map};
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Mock wheel actuator that records every commanded speed
#[derive(Clone)]
pub struct MockMotor {
    state: Arc<Mutex<MockMotorState>>,
}

#[derive(Debug, Default)]
struct MockMotorState {
    last_speed: f32,
    history: Vec<f32>,
}

impl MockMotor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockMotorState::default())),
        }
    }

    /// Most recently commanded speed
    pub fn last_speed(&self) -> f32 {
        self.state.lock().unwrap().last_speed
    }

    /// All commanded speeds, in order
    pub fn history(&self) -> Vec<f32> {
        self.state.lock().unwrap().history.clone()
    }
}

impl Default for MockMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl WheelActuator for MockMotor {
    fn run(&mut self, speed: f32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.last_speed = speed;
        state.history.push(speed);
        Ok(())
    }
}

/// Mock servo that records every commanded angle
#[derive(Clone)]
pub struct MockServo {
    state: Arc<Mutex<MockServoState>>,
}

#[derive(Debug, Default)]
struct MockServoState {
    last_angle: f32,
    history: Vec<f32>,
}

impl MockServo {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockServoState::default())),
        }
    }

    /// Most recently commanded angle in degrees
    pub fn last_angle(&self) -> f32 {
        self.state.lock().unwrap().last_angle
    }

    /// All commanded angles, in order
    pub fn angles(&self) -> Vec<f32> {
        self.state.lock().unwrap().history.clone()
    }
}

impl Default for MockServo {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoSink for MockServo {
    fn set_angle(&mut self, degrees: f32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.last_angle = degrees;
        state.history.push(degrees);
        Ok(())
    }
}

/// Mock camera
///
/// A capture thread produces synthetic frames at the configured rate
/// through a depth-1 channel. `read_frame` blocks until the next frame,
/// so consumers run at most at camera speed, like with real capture
/// hardware.
pub struct MockCamera {
    frames: Receiver<Frame>,
    shutdown: Arc<AtomicBool>,
    capture_handle: Option<JoinHandle<()>>,
    open: bool,
}

impl MockCamera {
    pub fn new(width: u32, height: u32, fps: f32) -> Result<Self> {
        if fps <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "camera fps must be positive, got {}",
                fps
            )));
        }

        let (frame_tx, frame_rx) = bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);
        let interval = Duration::from_secs_f32(1.0 / fps);

        let handle = thread::Builder::new()
            .name("mock-camera".to_string())
            .spawn(move || {
                while !thread_shutdown.load(Ordering::Relaxed) {
                    // Depth-1 channel: if the consumer lags, the queued
                    // frame stays and this one is dropped.
                    let _ = frame_tx.try_send(Frame::empty(width, height));
                    thread::sleep(interval);
                }
            })
            .map_err(|e| Error::Thread(format!("Failed to spawn capture thread: {}", e)))?;

        Ok(Self {
            frames: frame_rx,
            shutdown,
            capture_handle: Some(handle),
            open: true,
        })
    }
}

impl Camera for MockCamera {
    fn is_open(&self) -> bool {
        self.open
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if !self.open {
            return Ok(None);
        }
        match self.frames.recv_timeout(Duration::from_secs(1)) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::Camera("capture thread exited".to_string()))
            }
        }
    }

    fn release(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.capture_handle.take() {
            let _ = handle.join();
        }
        self.open = false;
    }
}

impl Drop for MockCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Synthetic target state for un-scripted detection
#[derive(Debug)]
struct WanderTarget {
    class_id: u32,
    /// Box center, normalized to [0, 1] frame coordinates
    x: f32,
    y: f32,
    /// Box edge as a fraction of frame width
    size: f32,
}

impl WanderTarget {
    fn new(class_id: u32) -> Self {
        Self {
            class_id,
            x: 0.5,
            y: 0.5,
            size: 0.25,
        }
    }

    /// Random-walk one step and render the target into frame coordinates
    fn advance(&mut self, rng: &mut SmallRng, frame: &Frame) -> Detection {
        self.x = (self.x + gaussian(rng, 0.02)).clamp(0.1, 0.9);
        self.y = (self.y + gaussian(rng, 0.02)).clamp(0.1, 0.9);
        self.size = (self.size + gaussian(rng, 0.01)).clamp(0.05, 0.6);

        let w = frame.width as f32;
        let h = frame.height as f32;
        let cx = self.x * w;
        let cy = self.y * h;
        let half = self.size * w / 2.0;

        Detection {
            class_id: self.class_id,
            score: (0.85 + gaussian(rng, 0.05)).clamp(0.0, 1.0),
            bbox: BoundingBox::new(
                (cx - half).max(0.0),
                (cy - half).max(0.0),
                (cx + half).min(w),
                (cy + half).min(h),
            ),
        }
    }
}

fn gaussian(rng: &mut SmallRng, stddev: f32) -> f32 {
    let n: f32 = rng.sample(StandardNormal);
    n * stddev
}

/// Mock detector
///
/// Scripted scenes queued with [`push_scene`](MockDetector::push_scene)
/// are replayed first, one scene per `detect` call. When the queue is
/// empty, a detector built with a wandering target synthesizes one hit
/// per frame; otherwise it reports nothing.
pub struct MockDetector {
    labels: HashMap<u32, String>,
    inner: Mutex<DetectorInner>,
}

struct DetectorInner {
    script: VecDeque<Vec<Detection>>,
    wander: Option<WanderTarget>,
    rng: SmallRng,
}

impl MockDetector {
    /// Create a detector with a label table.
    ///
    /// If seed is 0, uses random entropy; otherwise the wandering target
    /// is reproducible.
    pub fn new<I, S>(labels: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self {
            labels: label_map(labels),
            inner: Mutex::new(DetectorInner {
                script: VecDeque::new(),
                wander: None,
                rng,
            }),
        }
    }

    /// Keep a synthetic target of the given class in view whenever no
    /// scripted scenes are queued
    pub fn with_wandering_target(self, class_id: u32) -> Self {
        self.inner.lock().unwrap().wander = Some(WanderTarget::new(class_id));
        self
    }

    /// Queue one scene. Each `detect` call consumes one queued scene,
    /// even when every hit in it falls below the caller's threshold.
    pub fn push_scene(&self, detections: Vec<Detection>) {
        self.inner.lock().unwrap().script.push_back(detections);
    }

    /// Number of scenes still queued
    pub fn pending_scenes(&self) -> usize {
        self.inner.lock().unwrap().script.len()
    }
}

impl Detector for MockDetector {
    fn detect(&self, frame: &Frame, threshold: f32) -> Result<Vec<Detection>> {
        let mut inner = self.inner.lock().unwrap();
        let DetectorInner {
            script,
            wander,
            rng,
        } = &mut *inner;

        let mut hits = match script.pop_front() {
            Some(scene) => scene,
            None => match wander {
                Some(target) => vec![target.advance(rng, frame)],
                None => Vec::new(),
            },
        };

        hits.retain(|d| d.score >= threshold);
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }

    fn label(&self, class_id: u32) -> Option<&str> {
        self.labels.get(&class_id).map(String::as_str)
    }
}

/// Mock status display that records the last published report
#[derive(Clone, Default)]
pub struct MockDisplay {
    last: Arc<Mutex<Option<StatusReport>>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_report(&self) -> Option<StatusReport> {
        self.last.lock().unwrap().clone()
    }
}

impl StatusSink for MockDisplay {
    fn publish(&mut self, report: &StatusReport) -> Result<()> {
        *self.last.lock().unwrap() = Some(report.clone());
        Ok(())
    }
}

/// Class labels the mock object model ships with (YOLO/COCO indices)
pub fn default_object_labels() -> Vec<(u32, &'static str)> {
    vec![
        (0, "person"),
        (15, "cat"),
        (16, "dog"),
        (39, "bottle"),
        (56, "chair"),
        (77, "teddy bear"),
    ]
}

/// Handles into a mock rig's recorders, for tests and demos.
///
/// Wheels are ordered `[left_front, right_front, left_back, right_back]`.
pub struct MockRigHandles {
    pub wheels: [MockMotor; 4],
    pub pan_servo: MockServo,
    pub tilt_servo: MockServo,
    pub object_detector: Arc<MockDetector>,
    pub face_detector: Arc<MockDetector>,
    pub display: MockDisplay,
}

/// Build a complete mock rig, returning it together with handles to the
/// recorders so callers can inspect commanded outputs.
pub fn mock_rig(config: &AppConfig) -> Result<(HardwareRig, MockRigHandles)> {
    let seed = config.hardware.random_seed;

    let wheels = [
        MockMotor::new(),
        MockMotor::new(),
        MockMotor::new(),
        MockMotor::new(),
    ];
    let pan_servo = MockServo::new();
    let tilt_servo = MockServo::new();

    // Person for the object model, the single face class for the face
    // model. Seeds are offset so the two targets do not move in lockstep.
    let object_detector =
        Arc::new(MockDetector::new(default_object_labels(), seed).with_wandering_target(0));
    let face_detector = Arc::new(
        MockDetector::new([(0u32, "face")], seed.wrapping_add(1)).with_wandering_target(0),
    );

    let display = MockDisplay::new();
    let camera = MockCamera::new(config.camera.width, config.camera.height, config.camera.fps)?;

    let rig = HardwareRig {
        left_front: Box::new(wheels[0].clone()),
        right_front: Box::new(wheels[1].clone()),
        left_back: Box::new(wheels[2].clone()),
        right_back: Box::new(wheels[3].clone()),
        pan_servo: Box::new(pan_servo.clone()),
        tilt_servo: Box::new(tilt_servo.clone()),
        camera: Box::new(camera),
        object_detector: Arc::clone(&object_detector) as Arc<dyn Detector>,
        face_detector: Arc::clone(&face_detector) as Arc<dyn Detector>,
        status_sink: Box::new(display.clone()),
    };

    let handles = MockRigHandles {
        wheels,
        pan_servo,
        tilt_servo,
        object_detector,
        face_detector,
        display,
    };

    Ok((rig, handles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(class_id: u32, score: f32) -> Detection {
        Detection {
            class_id,
            score,
            bbox: BoundingBox::new(100.0, 100.0, 200.0, 200.0),
        }
    }

    #[test]
    fn test_mock_motor_records_commands() {
        let motor = MockMotor::new();
        let mut sink: Box<dyn WheelActuator> = Box::new(motor.clone());
        sink.run(30.0).unwrap();
        sink.run(-10.0).unwrap();

        assert_eq!(motor.last_speed(), -10.0);
        assert_eq!(motor.history(), vec![30.0, -10.0]);
    }

    #[test]
    fn test_mock_servo_records_commands() {
        let servo = MockServo::new();
        let mut sink: Box<dyn ServoSink> = Box::new(servo.clone());
        sink.set_angle(90.0).unwrap();
        sink.set_angle(45.5).unwrap();

        assert_eq!(servo.last_angle(), 45.5);
        assert_eq!(servo.angles(), vec![90.0, 45.5]);
    }

    #[test]
    fn test_mock_camera_produces_frames() {
        let mut camera = MockCamera::new(320, 240, 200.0).unwrap();
        assert!(camera.is_open());

        for _ in 0..3 {
            let frame = camera.read_frame().unwrap().unwrap();
            assert_eq!(frame.width, 320);
            assert_eq!(frame.height, 240);
        }

        camera.release();
        assert!(!camera.is_open());
        assert!(camera.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_scripted_scenes_replay_in_order() {
        let detector = MockDetector::new(default_object_labels(), 1);
        detector.push_scene(vec![detection(0, 0.9)]);
        detector.push_scene(vec![detection(15, 0.8)]);

        let frame = Frame::empty(640, 480);
        assert_eq!(detector.detect(&frame, 0.5).unwrap()[0].class_id, 0);
        assert_eq!(detector.detect(&frame, 0.5).unwrap()[0].class_id, 15);
        // no wandering target configured, so the well runs dry
        assert!(detector.detect(&frame, 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_detect_filters_below_threshold() {
        let detector = MockDetector::new(default_object_labels(), 1);
        detector.push_scene(vec![detection(0, 0.9), detection(16, 0.2)]);

        let frame = Frame::empty(640, 480);
        let hits = detector.detect(&frame, 0.5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].class_id, 0);
    }

    #[test]
    fn test_detect_orders_by_descending_score() {
        let detector = MockDetector::new(default_object_labels(), 1);
        detector.push_scene(vec![detection(16, 0.6), detection(0, 0.9)]);

        let frame = Frame::empty(640, 480);
        let hits = detector.detect(&frame, 0.1).unwrap();
        assert_eq!(hits[0].score, 0.9);
        assert_eq!(hits[1].score, 0.6);
    }

    #[test]
    fn test_wandering_target_is_seeded() {
        let frame = Frame::empty(640, 480);
        let a = MockDetector::new(default_object_labels(), 42).with_wandering_target(0);
        let b = MockDetector::new(default_object_labels(), 42).with_wandering_target(0);

        for _ in 0..5 {
            let hits_a = a.detect(&frame, 0.0).unwrap();
            let hits_b = b.detect(&frame, 0.0).unwrap();
            assert_eq!(hits_a[0].bbox, hits_b[0].bbox);
            assert_eq!(hits_a[0].score, hits_b[0].score);
        }
    }

    #[test]
    fn test_wandering_target_stays_in_frame() {
        let frame = Frame::empty(640, 480);
        let detector = MockDetector::new(default_object_labels(), 7).with_wandering_target(0);

        for _ in 0..50 {
            let hits = detector.detect(&frame, 0.0).unwrap();
            let bbox = hits[0].bbox;
            assert!(bbox.x_min >= 0.0 && bbox.x_max <= 640.0);
            assert!(bbox.y_min >= 0.0 && bbox.y_max <= 480.0);
            assert!(bbox.area() > 0.0);
        }
    }

    #[test]
    fn test_labels_resolve() {
        let detector = MockDetector::new(default_object_labels(), 1);
        assert_eq!(detector.label(0), Some("person"));
        assert_eq!(detector.label(77), Some("teddy bear"));
        assert_eq!(detector.label(999), None);
    }

    #[test]
    fn test_mock_display_records_last_report() {
        let display = MockDisplay::new();
        let mut sink: Box<dyn StatusSink> = Box::new(display.clone());

        let mut report = StatusReport::default();
        report.set("command", "wait");
        sink.publish(&report).unwrap();
        report.set("command", "track");
        sink.publish(&report).unwrap();

        let last = display.last_report().unwrap();
        assert_eq!(last.lines(), &[("command".to_string(), "track".to_string())]);
    }

    #[test]
    fn test_mock_rig_handles_are_wired() {
        let mut config = AppConfig::default();
        config.camera.fps = 200.0;
        config.hardware.random_seed = 3;

        let (mut rig, handles) = mock_rig(&config).unwrap();
        rig.left_front.run(55.0).unwrap();
        rig.pan_servo.set_angle(120.0).unwrap();

        assert_eq!(handles.wheels[0].last_speed(), 55.0);
        assert_eq!(handles.pan_servo.last_angle(), 120.0);
        assert_eq!(handles.object_detector.label(0), Some("person"));
    }
}
