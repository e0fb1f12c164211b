//! Broadcast transport: fan each tick's batch out to network consumers.
//!
//! # Architecture
//!
//! ```text
//! SimulationClock ──broadcast::Sender<Batch>──┬──► consumer task ──► TcpStream
//!                   (bounded, drop-oldest)    ├──► consumer task ──► TcpStream
//!                                             └──► UdpBroadcaster ──► datagrams
//! ```
//!
//! Every consumer owns its own `broadcast::Receiver`. A slow consumer lags
//! and loses its oldest batches; it never blocks the clock or the other
//! consumers. A write error, a write that stays blocked past the write
//! timeout, or EOF disconnects only that consumer.

mod tcp;
mod udp;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use thiserror::Error;

pub use tcp::{TcpBroadcaster, DEFAULT_WRITE_TIMEOUT};
pub use udp::UdpBroadcaster;

/// Transport failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listener or socket could not be bound. Fatal at startup.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters shared by every transport task.
#[derive(Debug, Default)]
pub struct TransportStats {
    consumers: AtomicUsize,
    connections: AtomicU64,
    lagged_batches: AtomicU64,
    write_errors: AtomicU64,
    udp_errors: AtomicU64,
}

impl TransportStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumers currently connected.
    pub fn consumers(&self) -> usize {
        self.consumers.load(Ordering::Relaxed)
    }

    /// Consumers accepted since startup.
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    /// Batches skipped by lagging consumers.
    pub fn lagged_batches(&self) -> u64 {
        self.lagged_batches.load(Ordering::Relaxed)
    }

    /// Consumers dropped because a write failed.
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    pub fn udp_errors(&self) -> u64 {
        self.udp_errors.load(Ordering::Relaxed)
    }

    fn consumer_connected(&self) {
        self.consumers.fetch_add(1, Ordering::Relaxed);
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    fn consumer_disconnected(&self) {
        self.consumers.fetch_sub(1, Ordering::Relaxed);
    }

    fn lagged(&self, skipped: u64) {
        self.lagged_batches.fetch_add(skipped, Ordering::Relaxed);
    }

    fn write_failed(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn udp_failed(&self) {
        self.udp_errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// Address a UDP socket should bind to in order to reach `target`.
fn unspecified_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}
