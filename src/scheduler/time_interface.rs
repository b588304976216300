// src/scheduler/time_interface.rs - Tick sources for the control loop
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

/// Paces the control loop. Each call resolves at the start of the next cycle.
#[async_trait]
pub trait Ticker: Send {
    async fn tick(&mut self);
}

/// Wall-clock ticker backed by `tokio::time::interval`.
///
/// An overrun tick pushes the schedule back instead of firing a burst of
/// catch-up ticks.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticker driven by hand through a [`ManualTickHandle`]. Ticks queue up until
/// consumed; once every handle is dropped the ticker never fires again.
#[derive(Debug)]
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

#[derive(Debug, Clone)]
pub struct ManualTickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicker {
    pub fn new() -> (Self, ManualTickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, ManualTickHandle { tx })
    }
}

impl ManualTickHandle {
    /// Release `count` ticks. Returns false if the ticker is gone.
    pub fn advance(&self, count: usize) -> bool {
        (0..count).all(|_| self.tx.send(()).is_ok())
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}
