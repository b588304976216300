// Shared test doubles for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use hand_follow_rs::config::Config;
use hand_follow_rs::{LinkError, Position3, RobotLink, VelocityCommand};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    PoseRead,
    Velocity(VelocityCommand),
    Stop,
    Close,
}

/// Scriptable robot link that records every call.
#[derive(Debug, Clone)]
pub struct FakeLink {
    pose: Arc<Mutex<Position3>>,
    events: Arc<Mutex<Vec<LinkEvent>>>,
    /// Pose reads that succeed before every later read fails.
    pose_reads_before_fault: Option<usize>,
    reject_velocity: bool,
}

impl FakeLink {
    pub fn at(pose: Position3) -> Self {
        Self {
            pose: Arc::new(Mutex::new(pose)),
            events: Arc::new(Mutex::new(Vec::new())),
            pose_reads_before_fault: None,
            reject_velocity: false,
        }
    }

    pub fn failing_after(mut self, reads: usize) -> Self {
        self.pose_reads_before_fault = Some(reads);
        self
    }

    pub fn rejecting_velocity(mut self) -> Self {
        self.reject_velocity = true;
        self
    }

    pub fn set_pose(&self, pose: Position3) {
        *self.pose.lock().unwrap() = pose;
    }

    pub fn events(&self) -> Vec<LinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn velocities(&self) -> Vec<VelocityCommand> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LinkEvent::Velocity(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &LinkEvent) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: LinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl RobotLink for FakeLink {
    async fn current_pose(&mut self) -> Result<Position3, LinkError> {
        let reads = self.count(&LinkEvent::PoseRead);
        self.record(LinkEvent::PoseRead);
        match self.pose_reads_before_fault {
            Some(limit) if reads >= limit => Err(LinkError::Disconnected("cable pulled".to_string())),
            _ => Ok(*self.pose.lock().unwrap()),
        }
    }

    async fn send_velocity(&mut self, command: &VelocityCommand) -> Result<(), LinkError> {
        self.record(LinkEvent::Velocity(*command));
        if self.reject_velocity {
            return Err(LinkError::Command("twist refused".to_string()));
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), LinkError> {
        self.record(LinkEvent::Stop);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.record(LinkEvent::Close);
        Ok(())
    }
}

/// Reference deployment: center (0.5, 0, 0.5), box x,z in [0.1, 0.9], y in [-0.4, 0.4].
pub fn test_config() -> Config {
    Config::default()
}

pub const CENTER: Position3 = Position3::new(0.5, 0.0, 0.5);

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
