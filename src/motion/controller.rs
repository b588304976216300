// src/motion/controller.rs - Proportional velocity controller
use super::{Axis, Position3, VelocityCommand};
use crate::config::ControlConfig;

/// Per-axis `clamp((target - current) * gain, -max_speed, max_speed)`.
///
/// Memoryless: the same inputs always give the same command.
pub fn proportional_velocity(
    target: Position3,
    current: Position3,
    gain: f64,
    max_speed: f64,
) -> VelocityCommand {
    let error = target - current;
    let axis_velocity = |axis: Axis| (error.get(axis) * gain).max(-max_speed).min(max_speed);
    VelocityCommand::new(
        axis_velocity(Axis::X),
        axis_velocity(Axis::Y),
        axis_velocity(Axis::Z),
    )
}

#[derive(Debug, Clone)]
pub struct VelocityController {
    gain: f64,
    max_speed: f64,
}

impl VelocityController {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            gain: config.gain,
            max_speed: config.max_speed,
        }
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn velocity(&self, target: Position3, current: Position3) -> VelocityCommand {
        proportional_velocity(target, current, self.gain, self.max_speed)
    }
}
