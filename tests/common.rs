//! Test utilities for driving the supervisor against the mock rig.
//!
//! Builds a supervisor whose detectors are script-only (no wandering
//! target), so every cycle sees exactly the detections a test pushed.

#![allow(dead_code)]

use drishti_bot::config::AppConfig;
use drishti_bot::devices::mock::{MockDetector, MockRigHandles, default_object_labels, mock_rig};
use drishti_bot::robot::Robot;
use drishti_bot::shared::SharedState;
use drishti_bot::supervisor::Supervisor;
use drishti_bot::vision::{BoundingBox, Detection, Detector, Perception};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Class index the mock object detector labels "person"
pub const PERSON_CLASS: u32 = 0;

/// Class index the mock object detector labels "cat"
pub const CAT_CLASS: u32 = 15;

/// Configuration tuned for fast tests: high camera rate so frames are
/// always ready, short scan dwell and poll intervals.
pub fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.camera.fps = 200.0;
    config.hardware.random_seed = 29;
    config.find.poll_interval_ms = 2;
    config.find.sweep_step_secs = 0.01;
    config
}

/// Everything a scenario needs: the supervisor, the actuator recorders,
/// the shared command handle, and the scriptable detectors.
pub struct Scenario {
    pub supervisor: Supervisor,
    pub handles: MockRigHandles,
    pub shared: Arc<SharedState>,
    pub objects: Arc<MockDetector>,
    pub faces: Arc<MockDetector>,
}

/// Build a supervisor on the mock rig with script-only detectors
pub fn scenario() -> Scenario {
    scenario_with_config(fast_config())
}

pub fn scenario_with_config(config: AppConfig) -> Scenario {
    let (rig, handles) = mock_rig(&config).expect("mock rig");
    let (robot, _) = Robot::from_rig(&config, rig).expect("robot");

    let objects = Arc::new(MockDetector::new(default_object_labels(), 1));
    let faces = Arc::new(MockDetector::new([(0u32, "face")], 1));
    let perception = Perception {
        object_detector: Arc::clone(&objects) as Arc<dyn Detector>,
        face_detector: Arc::clone(&faces) as Arc<dyn Detector>,
    };

    let shared = Arc::new(SharedState::new());
    let supervisor = Supervisor::new(config, robot, perception, Arc::clone(&shared));

    Scenario {
        supervisor,
        handles,
        shared,
        objects,
        faces,
    }
}

/// A detection centered at (cx, cy) with the given square size
pub fn detection_at(class_id: u32, score: f32, cx: f32, cy: f32, size: f32) -> Detection {
    let half = size / 2.0;
    Detection {
        class_id,
        score,
        bbox: BoundingBox::new(cx - half, cy - half, cx + half, cy + half),
    }
}

/// Give the find-scan thread time to poll and react
pub fn settle() {
    thread::sleep(Duration::from_millis(40));
}
