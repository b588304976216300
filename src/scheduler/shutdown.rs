// src/scheduler/shutdown.rs - Cancellation shared by the feed and the control loop
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Creates a linked trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, ShutdownSignal { rx })
}

/// Requests shutdown. Dropping every handle also counts as a request.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal { rx: self.tx.subscribe() }
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once shutdown has been requested. Cancel safe.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

/// Turn the first interrupt into a shutdown request and call `force` on the
/// second, for when a graceful stop hangs.
///
/// `next_interrupt` resolves on each interrupt, e.g. `tokio::signal::ctrl_c`.
pub async fn watch_interrupts<F, Fut>(handle: ShutdownHandle, mut next_interrupt: F, force: impl FnOnce())
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    match next_interrupt().await {
        Ok(()) => tracing::info!("Interrupt received, stopping robot (interrupt again to force exit)"),
        Err(e) => {
            tracing::error!("Failed to listen for interrupts: {}", e);
            handle.trigger();
            return;
        }
    }
    handle.trigger();

    match next_interrupt().await {
        Ok(()) => {
            tracing::warn!("Second interrupt, exiting without waiting for the robot");
            force();
        }
        Err(e) => tracing::error!("Failed to listen for interrupts: {}", e),
    }
}
