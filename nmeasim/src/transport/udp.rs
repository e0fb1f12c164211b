//! UDP datagram output.
//!
//! Each record goes out as its own datagram, the way NMEA-over-UDP
//! listeners expect. Send failures are logged and counted, never fatal.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{unspecified_for, TransportError, TransportStats};
use crate::sim::Batch;

/// Sends every batch to one UDP target (unicast or broadcast).
pub struct UdpBroadcaster {
    socket: UdpSocket,
    target: SocketAddr,
    batches: broadcast::Receiver<Batch>,
    stats: Arc<TransportStats>,
    shutdown: CancellationToken,
}

impl UdpBroadcaster {
    /// Bind an ephemeral local socket for sending to `target`.
    pub async fn bind(
        target: SocketAddr,
        batches: broadcast::Receiver<Batch>,
        stats: Arc<TransportStats>,
        shutdown: CancellationToken,
    ) -> Result<Self, TransportError> {
        let local = unspecified_for(&target);
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| TransportError::Bind {
                addr: local.to_string(),
                source,
            })?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket,
            target,
            batches,
            stats,
            shutdown,
        })
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        tracing::info!(target = %self.target, "UDP output started");
        let mut datagrams: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    loop {
                        match self.batches.try_recv() {
                            Ok(batch) => datagrams += self.send(&batch).await,
                            Err(TryRecvError::Lagged(skipped)) => self.stats.lagged(skipped),
                            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                        }
                    }
                    break;
                }
                received = self.batches.recv() => match received {
                    Ok(batch) => datagrams += self.send(&batch).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "UDP output lagging, dropped oldest batches");
                        self.stats.lagged(skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        tracing::info!(
            datagrams,
            errors = self.stats.udp_errors(),
            "UDP output stopped"
        );
    }

    /// Send each record of `batch`; returns how many went out.
    async fn send(&self, batch: &Batch) -> u64 {
        let mut sent = 0;
        for sentence in batch.iter() {
            match self.socket.send_to(&sentence.payload, self.target).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    self.stats.udp_failed();
                    tracing::warn!(target = %self.target, error = %e, "UDP send failed");
                }
            }
        }
        sent
    }
}
