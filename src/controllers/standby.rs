//! Idle controller

use super::ControlContext;
use crate::error::Result;

/// The safe idle state. Deactivation of the previous controller already
/// zeroed the velocity fields, so there is nothing to do per cycle.
#[derive(Debug, Default)]
pub struct StandbyController;

impl StandbyController {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, _ctx: &ControlContext<'_>) -> Result<()> {
        Ok(())
    }
}
