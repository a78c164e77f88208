//! Tracking behavior through the full stack: detector output in, servo
//! and wheel commands out.
//!
//! The PID terms depend on wall-clock timing, so assertions stick to
//! signs, exact zeroes, and relative comparisons rather than magnitudes.
//!
//! Run with: `cargo test --test tracking`

mod common;

use approx::assert_relative_eq;
use common::{CAT_CLASS, PERSON_CLASS, Scenario, detection_at, fast_config, scenario};
use drishti_bot::command::Command;
use drishti_bot::controllers::ControllerKind;
use drishti_bot::robot::create_robot;
use drishti_bot::shared::SharedState;
use drishti_bot::supervisor::Supervisor;
use std::sync::Arc;

#[test]
fn test_face_target_routes_to_face_detector() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        objects,
        faces,
    } = scenario();

    shared.set_command(Command::Pan, Some("face".to_string()));
    objects.push_scene(vec![detection_at(PERSON_CLASS, 0.9, 600.0, 240.0, 80.0)]);
    faces.push_scene(vec![detection_at(0, 0.3, 160.0, 240.0, 60.0)]);

    supervisor.cycle().unwrap();

    // only the face model ran; the decoy scene is still queued
    assert_eq!(faces.pending_scenes(), 0);
    assert_eq!(objects.pending_scenes(), 1);
    // the face sits left of center, so pan swings positive
    assert!(handles.pan_servo.last_angle() > 90.0);

    supervisor.shutdown();
}

#[test]
fn test_track_person_presets_tilt() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        ..
    } = scenario();

    shared.set_command(Command::Track, Some("person".to_string()));
    supervisor.cycle().unwrap();

    assert_relative_eq!(shared.tilt(), 30.0, epsilon = 1e-3);
    // tilt servo is mounted mirrored: -30 + 90 center
    assert_relative_eq!(handles.tilt_servo.last_angle(), 60.0, epsilon = 1e-3);

    supervisor.shutdown();
}

#[test]
fn test_track_rejects_below_profile_threshold() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        objects,
        ..
    } = scenario();

    shared.set_command(Command::Track, Some("person".to_string()));
    // 0.5 is under the person profile's 0.6 confidence floor
    objects.push_scene(vec![detection_at(PERSON_CLASS, 0.5, 320.0, 240.0, 200.0)]);
    supervisor.cycle().unwrap();

    assert_eq!(shared.velocity(), (0.0, 0.0));
    for wheel in &handles.wheels {
        assert_eq!(wheel.last_speed(), 0.0);
    }

    // the same detection above the floor drives the approach
    objects.push_scene(vec![detection_at(PERSON_CLASS, 0.7, 320.0, 240.0, 200.0)]);
    supervisor.cycle().unwrap();

    for wheel in &handles.wheels {
        assert!(
            wheel.last_speed() > 50.0,
            "expected forward drive, got {}",
            wheel.last_speed()
        );
    }

    supervisor.shutdown();
}

#[test]
fn test_turning_damps_forward_speed() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        objects,
        ..
    } = scenario();

    shared.set_command(Command::Track, Some("cat".to_string()));
    // small cat well to the right of center
    objects.push_scene(vec![detection_at(CAT_CLASS, 0.9, 600.0, 240.0, 100.0)]);
    supervisor.cycle().unwrap();

    let (v, omega) = shared.velocity();
    assert!(omega < 0.0, "target right of center should turn clockwise");
    assert!(v > 0.0);

    // clockwise turn while advancing: left wheel leads
    let left = handles.wheels[0].last_speed();
    let right = handles.wheels[1].last_speed();
    assert!(left > right, "left {left} should lead right {right}");
    assert!(right > 0.0);

    supervisor.shutdown();
}

#[test]
fn test_deactivation_stops_motion_keeps_head() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        objects,
        ..
    } = scenario();

    shared.set_command(Command::Track, Some("person".to_string()));
    objects.push_scene(vec![detection_at(PERSON_CLASS, 0.9, 320.0, 240.0, 200.0)]);
    supervisor.cycle().unwrap();
    assert!(handles.wheels[0].last_speed() > 0.0);

    shared.set_command(Command::Wait, None);
    supervisor.cycle().unwrap();

    assert_eq!(supervisor.controller_kind(), ControllerKind::Standby);
    for wheel in &handles.wheels {
        assert_eq!(wheel.last_speed(), 0.0);
    }
    // the head keeps pointing where tracking left it
    assert_relative_eq!(shared.tilt(), 30.0, epsilon = 1e-3);
    assert_relative_eq!(handles.tilt_servo.last_angle(), 60.0, epsilon = 1e-3);

    supervisor.shutdown();
}

#[test]
fn test_factory_rig_tracks_out_of_the_box() {
    // the stock mock rig carries a wandering person, so tracking engages
    // without any scripting
    let config = fast_config();
    let (robot, perception) = create_robot(&config).unwrap();
    let shared = Arc::new(SharedState::new());
    let mut supervisor = Supervisor::new(config, robot, perception, Arc::clone(&shared));

    shared.set_command(Command::Track, Some("person".to_string()));
    for _ in 0..3 {
        supervisor.cycle().unwrap();
    }

    let (v, _) = shared.velocity();
    assert!(v > 0.0, "wandering person should pull the robot forward");

    supervisor.shutdown();
}
