// src/simulator/mod.rs - Hardware-free robot link
use crate::config::SimulatorConfig;
use crate::hardware::{LinkError, RobotLink};
use crate::motion::{Position3, VelocityCommand};
use async_trait::async_trait;
use std::time::Instant;

/// Kinematic stand-in for a manipulator end-effector.
///
/// The achieved velocity follows the commanded one through a first-order lag,
/// and the pose integrates the achieved velocity. Time advances from the wall
/// clock on every pose read, or explicitly through [`SimulatedRobot::advance`].
#[derive(Debug)]
pub struct SimulatedRobot {
    pose: Position3,
    velocity: VelocityCommand,
    commanded: VelocityCommand,
    response_time: f64,
    last_update: Instant,
    commands_received: u64,
    stops_received: u64,
    closed: bool,
}

impl SimulatedRobot {
    pub fn new(config: &SimulatorConfig) -> Self {
        tracing::info!("Simulated robot initialized at {}", config.initial_pose);
        Self {
            pose: config.initial_pose,
            velocity: VelocityCommand::ZERO,
            commanded: VelocityCommand::ZERO,
            response_time: config.response_time,
            last_update: Instant::now(),
            commands_received: 0,
            stops_received: 0,
            closed: false,
        }
    }

    /// Step the model forward by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let alpha = if self.response_time > 0.0 {
            1.0 - (-dt / self.response_time).exp()
        } else {
            1.0
        };
        let v = &mut self.velocity;
        v.vx += (self.commanded.vx - v.vx) * alpha;
        v.vy += (self.commanded.vy - v.vy) * alpha;
        v.vz += (self.commanded.vz - v.vz) * alpha;
        self.pose = self.pose + Position3::new(v.vx * dt, v.vy * dt, v.vz * dt);
    }

    pub fn pose(&self) -> Position3 {
        self.pose
    }

    pub fn velocity(&self) -> VelocityCommand {
        self.velocity
    }

    pub fn commands_received(&self) -> u64 {
        self.commands_received
    }

    pub fn stops_received(&self) -> u64 {
        self.stops_received
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn sync_clock(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        self.advance(dt);
    }

    fn ensure_open(&self) -> Result<(), LinkError> {
        if self.closed {
            Err(LinkError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RobotLink for SimulatedRobot {
    async fn current_pose(&mut self) -> Result<Position3, LinkError> {
        self.ensure_open()?;
        self.sync_clock();
        Ok(self.pose)
    }

    async fn send_velocity(&mut self, command: &VelocityCommand) -> Result<(), LinkError> {
        self.ensure_open()?;
        self.sync_clock();
        self.commanded = *command;
        self.commands_received += 1;
        tracing::trace!("Simulated robot commanded {}", command);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), LinkError> {
        self.ensure_open()?;
        self.sync_clock();
        self.commanded = VelocityCommand::ZERO;
        self.velocity = VelocityCommand::ZERO;
        self.stops_received += 1;
        tracing::debug!("Simulated robot stopped at {}", self.pose);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.ensure_open()?;
        self.closed = true;
        tracing::info!("Simulated robot session closed");
        Ok(())
    }
}
