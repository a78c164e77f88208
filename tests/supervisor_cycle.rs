//! Supervisor state-machine scenarios against the mock rig.
//!
//! Each test drives the control cycle by hand (or runs the full loop on
//! a thread) and checks what reaches the actuator recorders:
//! - command words map to the right controller
//! - find sweeps, latches on its target, and hands off to track
//! - goodbye and Ctrl-C take the clean-shutdown path
//!
//! Run with: `cargo test --test supervisor_cycle`

mod common;

use common::{CAT_CLASS, PERSON_CLASS, Scenario, detection_at, scenario, settle};
use drishti_bot::command::Command;
use drishti_bot::controllers::ControllerKind;
use std::thread;
use std::time::Duration;

#[test]
fn test_boot_cycle_is_standby() {
    let Scenario {
        mut supervisor,
        handles,
        ..
    } = scenario();

    supervisor.cycle().unwrap();
    assert_eq!(supervisor.controller_kind(), ControllerKind::Standby);

    let report = handles.display.last_report().unwrap();
    assert_eq!(report.lines()[0], ("command".to_string(), "wait".to_string()));
    for wheel in &handles.wheels {
        assert_eq!(wheel.last_speed(), 0.0);
    }

    supervisor.shutdown();
}

#[test]
fn test_command_walkthrough() {
    let Scenario {
        mut supervisor,
        shared,
        ..
    } = scenario();

    let steps = [
        (Command::Pan, ControllerKind::PanTilt),
        (Command::Track, ControllerKind::Track),
        (Command::Find, ControllerKind::Find),
        (Command::Drive, ControllerKind::DriveTest),
        (Command::Wait, ControllerKind::Standby),
    ];

    for (command, kind) in steps {
        shared.set_command(command, Some("person".to_string()));
        supervisor.cycle().unwrap();
        assert_eq!(supervisor.controller_kind(), kind, "after '{}'", command);
    }

    supervisor.shutdown();
}

#[test]
fn test_find_scans_latches_and_hands_off_to_track() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        objects,
        ..
    } = scenario();

    shared.set_command(Command::Find, Some("cat".to_string()));
    supervisor.cycle().unwrap();
    assert_eq!(supervisor.controller_kind(), ControllerKind::Find);

    // scan thread is rotating the robot in place by now
    settle();
    supervisor.cycle().unwrap();
    let left = handles.wheels[0].last_speed();
    let right = handles.wheels[1].last_speed();
    assert!(left < -20.0, "left wheel should reverse, got {left}");
    assert!(right > 20.0, "right wheel should go forward, got {right}");

    // a cat enters the frame: the flag latches and the sweep stops
    objects.push_scene(vec![detection_at(CAT_CLASS, 0.9, 320.0, 240.0, 100.0)]);
    supervisor.cycle().unwrap();
    settle();

    // next cycle rewrites the command; the controller switch follows
    supervisor.cycle().unwrap();
    let (command, target) = shared.command();
    assert_eq!(command, Command::Track);
    assert_eq!(target, "cat");
    assert_eq!(supervisor.controller_kind(), ControllerKind::Find);

    // track takes over and drives toward the still-small cat
    objects.push_scene(vec![detection_at(CAT_CLASS, 0.9, 320.0, 240.0, 100.0)]);
    supervisor.cycle().unwrap();
    assert_eq!(supervisor.controller_kind(), ControllerKind::Track);
    for wheel in &handles.wheels {
        assert!(
            wheel.last_speed() > 50.0,
            "expected forward drive, got {}",
            wheel.last_speed()
        );
    }
    assert_eq!(
        handles.wheels[0].last_speed(),
        handles.wheels[1].last_speed()
    );

    // cat fills the goal fraction of the frame: approach complete
    objects.push_scene(vec![detection_at(CAT_CLASS, 0.9, 320.0, 240.0, 310.0)]);
    supervisor.cycle().unwrap();
    for wheel in &handles.wheels {
        assert_eq!(wheel.last_speed(), 0.0);
    }

    supervisor.shutdown();
}

#[test]
fn test_pan_moves_servos_not_wheels() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        objects,
        ..
    } = scenario();

    shared.set_command(Command::Pan, Some("person".to_string()));
    objects.push_scene(vec![detection_at(PERSON_CLASS, 0.9, 160.0, 240.0, 80.0)]);
    supervisor.cycle().unwrap();

    assert_eq!(supervisor.controller_kind(), ControllerKind::PanTilt);
    // target left of center: pan swings positive from the 90° hardware center
    assert!(handles.pan_servo.last_angle() > 90.0);
    for wheel in &handles.wheels {
        assert_eq!(wheel.last_speed(), 0.0);
    }

    supervisor.shutdown();
}

#[test]
fn test_run_loop_exits_on_goodbye() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        ..
    } = scenario();

    let loop_thread = thread::spawn(move || supervisor.run());

    thread::sleep(Duration::from_millis(30));
    shared.set_command(Command::Pan, Some("person".to_string()));
    thread::sleep(Duration::from_millis(30));
    shared.set_command(Command::Goodbye, None);

    let result = loop_thread.join().expect("control loop panicked");
    assert!(result.is_ok());
    assert!(shared.should_shutdown());

    // shutdown stopped the drive on the way out
    for wheel in &handles.wheels {
        assert_eq!(wheel.last_speed(), 0.0);
    }
}

#[test]
fn test_status_follows_command_changes() {
    let Scenario {
        mut supervisor,
        handles,
        shared,
        ..
    } = scenario();

    shared.set_command(Command::Drive, None);
    supervisor.cycle().unwrap();
    let report = handles.display.last_report().unwrap();
    assert_eq!(
        report.lines(),
        &[
            ("command".to_string(), "drive".to_string()),
            ("target_object".to_string(), String::new()),
            ("controller".to_string(), "Drive Test".to_string()),
        ]
    );

    shared.set_command(Command::Wait, None);
    supervisor.cycle().unwrap();
    let report = handles.display.last_report().unwrap();
    assert_eq!(report.lines()[0], ("command".to_string(), "wait".to_string()));
    assert_eq!(
        report.lines()[2],
        ("controller".to_string(), "Standby".to_string())
    );

    supervisor.shutdown();
}
