//! Closed-loop hand following for a Cartesian velocity-controlled manipulator.
//!
//! A [`PositionFeed`] receives hand samples over UDP into a
//! [`SharedLatestPosition`]. Every tick the [`ControlLoop`] maps the latest
//! sample into the robot frame, offsets it from the center point, clamps it to
//! the workspace and sends the proportional velocity towards it over a
//! [`RobotLink`].

pub mod communication;
pub mod config;
pub mod hardware;
pub mod motion;
pub mod scheduler;
pub mod simulator;
pub mod tracking;

pub use communication::{PositionFeed, SharedLatestPosition};
pub use config::{load_config, Config, ConfigError};
pub use hardware::{LinkError, RobotLink};
pub use motion::{AxisMapper, Position3, VelocityCommand, VelocityController, WorkspaceGuard};
pub use scheduler::{shutdown_channel, IntervalTicker, ManualTicker, ShutdownHandle, ShutdownSignal, Ticker};
pub use simulator::SimulatedRobot;
pub use tracking::{ControlError, ControlLoop, LoopReport, LoopState, TickOutcome};
