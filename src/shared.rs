//! State shared across the control loop and input threads

use crate::command::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The pan/tilt/velocity command set. Controllers write it through
/// [`SharedState`]; the supervisor copies it into the robot mirror once
/// per cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RobotState {
    /// Pan angle command in degrees (0 = center)
    pub pan: f32,

    /// Tilt angle command in degrees (0 = level)
    pub tilt: f32,

    /// Linear velocity command in m/s
    pub v: f32,

    /// Angular velocity command in rad/s
    pub omega: f32,
}

#[derive(Debug)]
struct Fields {
    command: Command,
    target_object: String,
    state: RobotState,
}

/// Mutable state shared between the supervisor loop, command-input
/// threads, and the Find controller's scan thread.
///
/// One mutex guards every field; contention is low (one consumer, few
/// producers, low frequency) so finer-grained locking buys nothing.
/// `command` and `target_object` are only ever written together, so a
/// reader can never observe a new command paired with a stale target.
pub struct SharedState {
    fields: Mutex<Fields>,
    shutdown: AtomicBool,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            fields: Mutex::new(Fields {
                command: Command::Wait,
                target_object: String::new(),
                state: RobotState::default(),
            }),
            shutdown: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Fields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current command pair
    pub fn command(&self) -> (Command, String) {
        let fields = self.lock();
        (fields.command, fields.target_object.clone())
    }

    /// Set the command, optionally replacing the target object. Both
    /// fields change under one critical section.
    pub fn set_command(&self, command: Command, target: Option<String>) {
        let mut fields = self.lock();
        fields.command = command;
        if let Some(target) = target {
            fields.target_object = target;
        }
        log::debug!(
            "SharedState: command={} target='{}'",
            fields.command,
            fields.target_object
        );
    }

    /// Snapshot of the pan/tilt/velocity command set
    pub fn snapshot(&self) -> RobotState {
        self.lock().state
    }

    pub fn pan(&self) -> f32 {
        self.lock().state.pan
    }

    pub fn set_pan(&self, pan: f32) {
        self.lock().state.pan = pan;
    }

    pub fn tilt(&self) -> f32 {
        self.lock().state.tilt
    }

    pub fn set_tilt(&self, tilt: f32) {
        self.lock().state.tilt = tilt;
    }

    /// Current (v, omega) pair
    pub fn velocity(&self) -> (f32, f32) {
        let fields = self.lock();
        (fields.state.v, fields.state.omega)
    }

    pub fn set_velocity(&self, v: f32, omega: f32) {
        let mut fields = self.lock();
        fields.state.v = v;
        fields.state.omega = omega;
    }

    /// Zero both velocity fields. Called on every controller
    /// deactivation and every scan-task exit path.
    pub fn stop_motion(&self) {
        self.set_velocity(0.0, 0.0);
    }

    /// Request shutdown of the control loop
    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Check if shutdown has been requested
    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
