//! Fixed-motion drive diagnostic

use super::ControlContext;
use crate::error::Result;
use std::f32::consts::PI;

/// Spins the robot in place at a constant rate, independent of
/// perception. Useful for verifying the kinematics chain and wheel
/// wiring end to end.
#[derive(Debug, Default)]
pub struct DriveTestController;

impl DriveTestController {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, ctx: &ControlContext<'_>) -> Result<()> {
        ctx.shared.set_velocity(0.0, PI);
        Ok(())
    }
}
