//! Command-driven control loop
//!
//! The supervisor owns the active controller and the robot facade. Each
//! cycle it refreshes the camera frame, applies command transitions,
//! runs the active controller, publishes status, and pushes the shared
//! state snapshot out to the actuators. Command producers (console,
//! voice, Ctrl-C) run on their own threads and only touch the shared
//! state handle.

use crate::command::Command;
use crate::config::AppConfig;
use crate::controllers::{ActiveController, ControlContext, ControllerKind, StandbyController};
use crate::error::Result;
use crate::robot::Robot;
use crate::shared::SharedState;
use crate::status::{LogStatusSink, StatusReport, StatusSink};
use crate::vision::{Frame, Perception};
use std::sync::Arc;

pub struct Supervisor {
    config: AppConfig,
    shared: Arc<SharedState>,
    robot: Robot,
    perception: Perception,
    controller: ActiveController,
    log_sink: LogStatusSink,

    /// Frame acquired this cycle; `None` means vision-less operation
    frame: Option<Frame>,
}

impl Supervisor {
    pub fn new(
        config: AppConfig,
        robot: Robot,
        perception: Perception,
        shared: Arc<SharedState>,
    ) -> Self {
        Self {
            config,
            shared,
            robot,
            perception,
            controller: ActiveController::Standby(StandbyController::new()),
            log_sink: LogStatusSink::new(),
            frame: None,
        }
    }

    /// Handle command producers use to reach this supervisor
    pub fn shared(&self) -> Arc<SharedState> {
        Arc::clone(&self.shared)
    }

    pub fn controller_kind(&self) -> ControllerKind {
        self.controller.kind()
    }

    /// Run cycles until shutdown is signalled. The robot is released on
    /// every exit path, including the error one.
    pub fn run(&mut self) -> Result<()> {
        log::info!("Supervisor: control loop started");
        let result = self.run_inner();
        self.shutdown();
        result
    }

    fn run_inner(&mut self) -> Result<()> {
        while !self.shared.should_shutdown() {
            self.cycle()?;
        }
        Ok(())
    }

    /// One pass of the control cycle
    pub fn cycle(&mut self) -> Result<()> {
        self.refresh_vision();
        self.apply_transitions()?;

        let (_, target) = self.shared.command();
        let ctx = ControlContext {
            shared: &self.shared,
            frame: self.frame.as_ref(),
            target: &target,
        };
        if let Err(e) = self.controller.update(&ctx) {
            if !e.is_recoverable() {
                return Err(e);
            }
            log::warn!(
                "Supervisor: {} controller failed ({}), falling back to standby",
                self.controller.kind(),
                e
            );
            self.controller.deactivate(&self.shared);
            self.controller = ActiveController::Standby(StandbyController::new());
            self.shared.set_command(Command::Wait, None);
        }

        self.publish_status()?;

        let snapshot = self.shared.snapshot();
        self.robot.apply(snapshot)
    }

    /// Acquire the cycle's frame. Camera trouble degrades to vision-less
    /// operation instead of stopping the loop.
    fn refresh_vision(&mut self) {
        self.frame = None;
        if !self.robot.camera_open() {
            return;
        }
        match self.robot.read_frame() {
            Ok(frame) => self.frame = frame,
            Err(e) => log::warn!("Supervisor: frame acquisition failed: {}", e),
        }
    }

    /// Evaluate the command against the active controller kind and
    /// switch when they disagree
    fn apply_transitions(&mut self) -> Result<()> {
        let (command, target) = self.shared.command();

        if command == Command::Goodbye {
            log::info!("Supervisor: goodbye received");
            self.shared.signal_shutdown();
            return Ok(());
        }

        // A Find controller that has seen its target hands the command
        // off to Track; the switch itself happens next cycle.
        if command == Command::Find
            && self.controller.kind() == ControllerKind::Find
            && self.controller.detection_set()
        {
            log::info!("Supervisor: '{}' found, tracking", target);
            self.shared.set_command(Command::Track, None);
            return Ok(());
        }

        let desired = match command {
            Command::Wait => ControllerKind::Standby,
            Command::Pan => ControllerKind::PanTilt,
            Command::Track => ControllerKind::Track,
            Command::Find => ControllerKind::Find,
            Command::Drive => ControllerKind::DriveTest,
            Command::Goodbye => return Ok(()),
        };

        if desired != self.controller.kind() {
            log::info!(
                "Supervisor: {} -> {} (target '{}')",
                self.controller.kind(),
                desired,
                target
            );
            self.controller.deactivate(&self.shared);
            self.controller = ActiveController::activate(
                desired,
                &self.shared,
                &self.perception,
                &self.config,
                &target,
            )?;
        }
        Ok(())
    }

    fn publish_status(&mut self) -> Result<()> {
        let (command, target) = self.shared.command();
        let mut report = StatusReport::default();
        report.set("command", command.as_str());
        report.set("target_object", target);
        report.set("controller", self.controller.kind().name());

        self.log_sink.publish(&report)?;
        self.robot.publish_status(&report)
    }

    /// Deactivate the controller and release the robot
    pub fn shutdown(&mut self) {
        self.controller.deactivate(&self.shared);
        self.robot.shutdown();
        log::info!("Supervisor: stopped");
    }
}
