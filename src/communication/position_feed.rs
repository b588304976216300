// src/communication/position_feed.rs - UDP hand position receiver
use crate::config::FeedConfig;
use crate::motion::Position3;
use crate::scheduler::ShutdownSignal;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Datagram is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Datagram is not a position record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wire record sent by the tracker. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct HandSample {
    x: f64,
    y: f64,
    z: f64,
}

/// Decode one datagram into a tracker-frame position (centimeters).
pub fn decode_sample(payload: &[u8]) -> Result<Position3, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    let sample: HandSample = serde_json::from_str(text)?;
    Ok(Position3::new(sample.x, sample.y, sample.z))
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Freshest hand position, shared between the receiver and the control loop.
///
/// The whole triple is swapped under one lock, so readers never see a mix of
/// two samples. Starts at the origin before any datagram arrives.
#[derive(Debug, Clone, Default)]
pub struct SharedLatestPosition {
    slot: Arc<Mutex<Position3>>,
}

impl SharedLatestPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, position: Position3) {
        *lock_or_recover(&self.slot) = position;
    }

    pub fn load(&self) -> Position3 {
        *lock_or_recover(&self.slot)
    }
}

/// Receiver counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub datagrams_received: u64,
    pub samples_accepted: u64,
    pub datagrams_dropped: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SharedFeedStats {
    inner: Arc<Mutex<FeedStats>>,
}

impl SharedFeedStats {
    pub fn snapshot(&self) -> FeedStats {
        *lock_or_recover(&self.inner)
    }

    fn record(&self, accepted: bool) -> FeedStats {
        let mut stats = lock_or_recover(&self.inner);
        stats.datagrams_received += 1;
        if accepted {
            stats.samples_accepted += 1;
        } else {
            stats.datagrams_dropped += 1;
        }
        *stats
    }
}

const RECEIVE_RETRY_DELAY: Duration = Duration::from_millis(100);
const MAX_CONSECUTIVE_RECEIVE_ERRORS: u32 = 50;

/// Consecutive socket failures. The feed pauses after each one and gives up
/// once the limit is reached.
#[derive(Debug)]
struct ReceiveErrors {
    consecutive: u32,
    limit: u32,
}

impl ReceiveErrors {
    fn new(limit: u32) -> Self {
        Self { consecutive: 0, limit }
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }

    /// Returns the pause before the next receive, or the error once the limit is hit.
    fn record(&mut self, error: std::io::Error) -> Result<Duration, FeedError> {
        self.consecutive += 1;
        if self.consecutive >= self.limit {
            tracing::error!("UDP receive failed {} times in a row: {}", self.consecutive, error);
            return Err(FeedError::Io(error));
        }
        tracing::warn!("UDP receive error ({} in a row): {}", self.consecutive, error);
        Ok(RECEIVE_RETRY_DELAY)
    }
}

/// Listens for tracker datagrams and publishes each decoded sample.
#[derive(Debug)]
pub struct PositionFeed {
    socket: UdpSocket,
    latest: SharedLatestPosition,
    stats: SharedFeedStats,
    max_datagram_size: usize,
}

impl PositionFeed {
    pub async fn bind(config: &FeedConfig, latest: SharedLatestPosition) -> Result<Self, FeedError> {
        let addr = config.socket_addr();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| FeedError::Bind { addr, source })?;
        tracing::info!("Listening for hand data on udp://{}", socket.local_addr()?);
        Ok(Self {
            socket,
            latest,
            stats: SharedFeedStats::default(),
            max_datagram_size: config.max_datagram_size,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, FeedError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn stats(&self) -> SharedFeedStats {
        self.stats.clone()
    }

    /// Decode a datagram and, if it holds a full record, publish it.
    /// A rejected datagram leaves the shared position untouched.
    pub fn handle_datagram(&self, payload: &[u8]) -> Result<Position3, DecodeError> {
        match decode_sample(payload) {
            Ok(position) => {
                self.latest.store(position);
                let stats = self.stats.record(true);
                if stats.samples_accepted == 1 {
                    tracing::info!(
                        "Receiving hand data, first sample: X {:.3} Y {:.3} Z {:.3} cm",
                        position.x,
                        position.y,
                        position.z
                    );
                } else {
                    tracing::trace!("Hand sample {}", position);
                }
                Ok(position)
            }
            Err(e) => {
                self.stats.record(false);
                tracing::debug!("Dropped datagram ({} bytes): {}", payload.len(), e);
                Err(e)
            }
        }
    }

    /// Receive until shutdown. The socket is released when this returns.
    /// Persistent socket failures end the feed with [`FeedError::Io`].
    pub async fn run(self, mut shutdown: ShutdownSignal) -> Result<(), FeedError> {
        let mut buffer = vec![0u8; self.max_datagram_size];
        let mut errors = ReceiveErrors::new(MAX_CONSECUTIVE_RECEIVE_ERRORS);
        let outcome = loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("Position feed shutting down");
                    break Ok(());
                }
                received = self.socket.recv_from(&mut buffer) => {
                    match received {
                        Ok((len, peer)) => {
                            errors.reset();
                            tracing::trace!("Datagram of {} bytes from {}", len, peer);
                            let _ = self.handle_datagram(&buffer[..len]);
                        }
                        Err(e) => match errors.record(e) {
                            Ok(pause) => {
                                tokio::select! {
                                    biased;
                                    _ = shutdown.cancelled() => {
                                        tracing::info!("Position feed shutting down");
                                        break Ok(());
                                    }
                                    _ = tokio::time::sleep(pause) => {}
                                }
                            }
                            Err(e) => break Err(e),
                        },
                    }
                }
            }
        };
        let stats = self.stats.snapshot();
        tracing::info!(
            "Position feed stopped: {} datagrams, {} accepted, {} dropped",
            stats.datagrams_received,
            stats.samples_accepted,
            stats.datagrams_dropped
        );
        outcome
    }
}
