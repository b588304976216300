// src/tracking.rs - Fixed-rate hand tracking loop
use crate::communication::SharedLatestPosition;
use crate::config::{Config, ConfigError};
use crate::hardware::{LinkError, RobotLink};
use crate::motion::{
    Axis, AxisMapper, GuardError, Position3, VelocityCommand, VelocityController, WorkspaceGuard,
};
use crate::scheduler::{ShutdownSignal, Ticker};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Failed to read robot pose: {0}")]
    PoseRead(#[source] LinkError),
    #[error("Not allowed while the control loop is {0:?}")]
    InvalidState(LoopState),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Tracking,
    Stopped,
}

/// Why a loop in the Tracking state ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    NonFiniteTarget(GuardError),
    NonFinitePose(Axis),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Commanded {
        target: Position3,
        current: Position3,
        velocity: VelocityCommand,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub commands_sent: u64,
    pub send_failures: u64,
    pub skipped_ticks: u64,
    /// Periodic target/robot/velocity records logged.
    pub status_records: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopReport {
    pub termination: Termination,
    pub session_id: Uuid,
    pub center: Option<Position3>,
    pub stats: LoopStats,
}

/// Reports a condition the first time it is seen, then stays quiet until cleared.
#[derive(Debug, Default)]
struct FaultLatch {
    raised: bool,
}

impl FaultLatch {
    fn raise(&mut self) -> bool {
        !std::mem::replace(&mut self.raised, true)
    }

    fn clear(&mut self) -> bool {
        std::mem::replace(&mut self.raised, false)
    }
}

/// Drives the robot towards `center + mapped hand offset`, clamped to the workspace.
///
/// Idle until [`ControlLoop::start`] captures the center point from the robot's
/// pose, Tracking while ticks run, Stopped after the robot has been halted and
/// its session closed. Stopped is terminal.
pub struct ControlLoop<L, T> {
    link: L,
    ticker: T,
    latest: SharedLatestPosition,
    mapper: AxisMapper,
    guard: WorkspaceGuard,
    controller: VelocityController,
    status_every: u64,
    state: LoopState,
    center: Option<Position3>,
    session_id: Uuid,
    stats: LoopStats,
    target_fault: FaultLatch,
    pose_fault: FaultLatch,
    outside_workspace: FaultLatch,
}

impl<L: RobotLink, T: Ticker> ControlLoop<L, T> {
    pub fn new(
        config: &Config,
        link: L,
        latest: SharedLatestPosition,
        ticker: T,
    ) -> Result<Self, ControlError> {
        config.control.validate()?;
        config.mapping.validate()?;
        Ok(Self {
            link,
            ticker,
            latest,
            mapper: AxisMapper::new(&config.mapping),
            guard: WorkspaceGuard::new(config.workspace)?,
            controller: VelocityController::new(&config.control),
            status_every: config.control.status_every,
            state: LoopState::Idle,
            center: None,
            session_id: Uuid::new_v4(),
            stats: LoopStats::default(),
            target_fault: FaultLatch::default(),
            pose_fault: FaultLatch::default(),
            outside_workspace: FaultLatch::default(),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn center(&self) -> Option<Position3> {
        self.center
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Idle -> Tracking. Hand offsets are measured from the pose read here.
    pub async fn start(&mut self) -> Result<Position3, ControlError> {
        if self.state != LoopState::Idle {
            return Err(ControlError::InvalidState(self.state));
        }
        let center = self.link.current_pose().await.map_err(ControlError::PoseRead)?;
        if let Some(axis) = center.first_non_finite() {
            return Err(ControlError::PoseRead(LinkError::Fault(format!(
                "non-finite {} in measured pose",
                axis
            ))));
        }
        self.center = Some(center);
        self.state = LoopState::Tracking;
        tracing::info!("Tracking session {} started", self.session_id);
        tracing::info!("Center point set to: {}", center);
        if !self.guard.contains(center) {
            tracing::warn!("Center point {} lies outside the workspace, targets will be clamped", center);
        }
        Ok(center)
    }

    /// Run one control cycle. Only a failed pose read is returned as an error.
    pub async fn tick(&mut self) -> Result<TickOutcome, ControlError> {
        let center = match (self.state, self.center) {
            (LoopState::Tracking, Some(center)) => center,
            (state, _) => return Err(ControlError::InvalidState(state)),
        };
        self.stats.ticks += 1;

        let hand = self.latest.load();
        let target = match self.guard.clamp(center + self.mapper.map(hand)) {
            Ok(target) => {
                if self.target_fault.clear() {
                    tracing::info!("Target is finite again, resuming commands");
                }
                target
            }
            Err(e) => {
                if self.target_fault.raise() {
                    tracing::warn!("Skipping ticks, no command sent: {} (hand sample {})", e, hand);
                }
                return Ok(self.skip(SkipReason::NonFiniteTarget(e)));
            }
        };

        let current = self.link.current_pose().await.map_err(ControlError::PoseRead)?;
        if let Some(axis) = current.first_non_finite() {
            if self.pose_fault.raise() {
                tracing::warn!("Robot reported non-finite {} position, skipping ticks", axis);
            }
            return Ok(self.skip(SkipReason::NonFinitePose(axis)));
        }
        if self.pose_fault.clear() {
            tracing::info!("Robot pose is finite again");
        }
        if !self.guard.contains(current) {
            if self.outside_workspace.raise() {
                tracing::warn!("Robot at {} is outside the workspace", current);
            }
        } else if self.outside_workspace.clear() {
            tracing::info!("Robot back inside the workspace at {}", current);
        }

        let velocity = self.controller.velocity(target, current);
        match self.link.send_velocity(&velocity).await {
            Ok(()) => self.stats.commands_sent += 1,
            Err(e) => {
                self.stats.send_failures += 1;
                tracing::warn!("Velocity command failed: {}", e);
            }
        }

        if self.stats.ticks % self.status_every == 0 {
            self.stats.status_records += 1;
            tracing::info!(
                session = %self.session_id,
                "Target: {}  Robot: {}  Vel: {}",
                target,
                current,
                velocity
            );
        }

        Ok(TickOutcome::Commanded { target, current, velocity })
    }

    fn skip(&mut self, reason: SkipReason) -> TickOutcome {
        self.stats.skipped_ticks += 1;
        TickOutcome::Skipped(reason)
    }

    /// Stop the robot and close its session. Runs at most once.
    async fn halt(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        tracing::info!("Stopping robot...");
        match self.link.stop().await {
            Ok(()) => tracing::info!("Robot stopped."),
            Err(e) => tracing::error!("Failed to stop robot: {}", e),
        }
        if let Err(e) = self.link.close().await {
            tracing::error!("Failed to close robot session: {}", e);
        }
        self.state = LoopState::Stopped;
    }

    /// Start tracking and tick until `shutdown` fires or the robot pose cannot
    /// be read. The robot is stopped and released on every exit path.
    ///
    /// The halt runs inside this future: it must be awaited to completion.
    /// Dropping or aborting it leaves the robot on its last commanded velocity,
    /// so request a stop through `shutdown` instead.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> Result<LoopReport, ControlError> {
        if let Err(e) = self.start().await {
            tracing::error!("Could not establish center point: {}", e);
            self.halt().await;
            return Err(e);
        }

        let outcome = loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("Stop requested, leaving tracking");
                    break Ok(Termination::Cancelled);
                }
                _ = self.ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::error!("Tracking aborted: {}", e);
                        break Err(e);
                    }
                }
            }
        };

        self.halt().await;
        let stats = self.stats;
        tracing::info!(
            "Session {} ended after {} ticks ({} commands, {} skipped, {} failed sends)",
            self.session_id,
            stats.ticks,
            stats.commands_sent,
            stats.skipped_ticks,
            stats.send_failures
        );
        outcome.map(|termination| LoopReport {
            termination,
            session_id: self.session_id,
            center: self.center,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_latch_reports_once() {
        let mut latch = FaultLatch::default();
        assert!(latch.raise());
        assert!(!latch.raise());
        assert!(latch.clear());
        assert!(!latch.clear());
        assert!(latch.raise());
    }
}
