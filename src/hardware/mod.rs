// src/hardware/mod.rs - Robot link abstraction consumed by the control loop
use crate::motion::{Position3, VelocityCommand};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LinkError {
    #[error("Robot link disconnected: {0}")]
    Disconnected(String),
    #[error("Robot reported fault: {0}")]
    Fault(String),
    #[error("Command rejected: {0}")]
    Command(String),
    #[error("Robot link already closed")]
    Closed,
}

/// Session with a manipulator that accepts Cartesian twist commands.
///
/// Opening the session (transport, login) happens before a link is handed to the
/// control loop. The loop calls [`RobotLink::close`] exactly once on shutdown.
#[async_trait]
pub trait RobotLink: Send {
    /// Measured end-effector position in the base frame, meters.
    async fn current_pose(&mut self) -> Result<Position3, LinkError>;

    /// Queue a twist. Returns once the command is handed off, not when motion completes.
    async fn send_velocity(&mut self, command: &VelocityCommand) -> Result<(), LinkError>;

    /// Halt all motion. Safe to call repeatedly.
    async fn stop(&mut self) -> Result<(), LinkError>;

    /// Release the session.
    async fn close(&mut self) -> Result<(), LinkError>;
}

