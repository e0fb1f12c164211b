//! TCP fan-out server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::{TransportError, TransportStats};
use crate::sim::Batch;

/// Longest a single batch write (or the final drain) may block on a consumer
/// before that consumer is dropped.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Accepts TCP consumers and streams every batch to each of them.
pub struct TcpBroadcaster {
    listener: TcpListener,
    local_addr: SocketAddr,
    batches: broadcast::Sender<Batch>,
    stats: Arc<TransportStats>,
    shutdown: CancellationToken,
    write_timeout: Duration,
}

impl TcpBroadcaster {
    /// Bind the listener.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bind`] if the address is unavailable.
    pub async fn bind(
        addr: &str,
        batches: broadcast::Sender<Batch>,
        stats: Arc<TransportStats>,
        shutdown: CancellationToken,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            batches,
            stats,
            shutdown,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        })
    }

    /// Override [`DEFAULT_WRITE_TIMEOUT`].
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start the accept loop as an async task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        tracing::info!(addr = %self.local_addr, "NMEA TCP server listening");

        let mut consumers = JoinSet::new();
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        consumers.spawn(serve_consumer(
                            stream,
                            peer,
                            self.batches.subscribe(),
                            Arc::clone(&self.stats),
                            self.shutdown.clone(),
                            self.write_timeout,
                        ));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept consumer");
                    }
                },
                Some(_) = consumers.join_next(), if !consumers.is_empty() => {}
            }
        }

        // Stop accepting, then let every consumer drain
        drop(self.listener);
        while consumers.join_next().await.is_some() {}

        tracing::info!(
            connections = self.stats.connections(),
            lagged_batches = self.stats.lagged_batches(),
            "NMEA TCP server stopped"
        );
    }
}

/// Stream batches to one consumer until it goes away or shutdown.
async fn serve_consumer(
    stream: TcpStream,
    peer: SocketAddr,
    mut batches: broadcast::Receiver<Batch>,
    stats: Arc<TransportStats>,
    shutdown: CancellationToken,
    write_timeout: Duration,
) {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(%peer, error = %e, "Failed to set TCP_NODELAY");
    }
    let (mut reader, mut writer) = stream.into_split();

    stats.consumer_connected();
    tracing::info!(%peer, consumers = stats.consumers(), "Consumer connected");

    let mut scratch = [0u8; 512];
    let reason = loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                break drain(&mut writer, &mut batches, &stats, peer, write_timeout).await;
            }
            received = batches.recv() => match received {
                Ok(batch) => {
                    // A consumer that stops reading blocks here; it must not
                    // hold up shutdown or stay connected forever
                    tokio::select! {
                        biased;
                        written = tokio::time::timeout(write_timeout, write_batch(&mut writer, &batch)) => {
                            match written {
                                Ok(Ok(())) => {}
                                Ok(Err(e)) => {
                                    tracing::warn!(%peer, error = %e, "Write to consumer failed");
                                    stats.write_failed();
                                    break "write error";
                                }
                                Err(_) => {
                                    tracing::warn!(%peer, timeout = ?write_timeout, "Consumer stalled, dropping it");
                                    stats.write_failed();
                                    break "write timed out";
                                }
                            }
                        }
                        _ = shutdown.cancelled() => {
                            tracing::debug!(%peer, "Shutdown while blocked on a write");
                            stats.write_failed();
                            break "shutdown during write";
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%peer, skipped, "Consumer lagging, dropped oldest batches");
                    stats.lagged(skipped);
                }
                Err(RecvError::Closed) => break "output closed",
            },
            read = reader.read(&mut scratch) => match read {
                Ok(0) => break "closed by peer",
                // Consumers have nothing to say; input is discarded
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "Read from consumer failed");
                    break "read error";
                }
            },
        }
    };

    stats.consumer_disconnected();
    tracing::info!(%peer, reason, consumers = stats.consumers(), "Consumer disconnected");
}

/// Write the batches already queued for this consumer, then close.
///
/// Bounded by `write_timeout` as a whole.
async fn drain(
    writer: &mut OwnedWriteHalf,
    batches: &mut broadcast::Receiver<Batch>,
    stats: &TransportStats,
    peer: SocketAddr,
    write_timeout: Duration,
) -> &'static str {
    match tokio::time::timeout(write_timeout, flush_queued(writer, batches, stats, peer)).await {
        Ok(reason) => reason,
        Err(_) => {
            tracing::warn!(%peer, timeout = ?write_timeout, "Consumer stalled while draining");
            stats.write_failed();
            "drain timed out"
        }
    }
}

async fn flush_queued(
    writer: &mut OwnedWriteHalf,
    batches: &mut broadcast::Receiver<Batch>,
    stats: &TransportStats,
    peer: SocketAddr,
) -> &'static str {
    loop {
        match batches.try_recv() {
            Ok(batch) => {
                if let Err(e) = write_batch(writer, &batch).await {
                    tracing::debug!(%peer, error = %e, "Write failed while draining");
                    stats.write_failed();
                    return "write error";
                }
            }
            Err(TryRecvError::Lagged(skipped)) => stats.lagged(skipped),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    if let Err(e) = writer.shutdown().await {
        tracing::debug!(%peer, error = %e, "Socket shutdown failed");
    }
    "shutdown"
}

async fn write_batch(writer: &mut OwnedWriteHalf, batch: &Batch) -> std::io::Result<()> {
    let len = batch.iter().map(|s| s.payload.len()).sum();
    let mut buf = BytesMut::with_capacity(len);
    for sentence in batch.iter() {
        buf.extend_from_slice(&sentence.payload);
    }
    writer.write_all(&buf).await?;
    writer.flush().await
}
