//! The [`Simulator`] facade: own the configuration, start and stop the
//! clock and transport tasks, and report status.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use super::clock::{ClockOutputs, SimulationClock};
use super::engine::Engine;
use super::output::Batch;
use super::status::{RunState, SimulationStatus};
use crate::config::{self, ConfigError, SimulationConfig};
use crate::transport::{TcpBroadcaster, TransportError, TransportStats, UdpBroadcaster};

/// Errors from the simulator lifecycle.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Simulation is already running")]
    AlreadyRunning,

    #[error("Simulation is not running")]
    NotRunning,

    #[error("Simulation task failed: {0}")]
    TaskFailed(String),
}

impl From<JoinError> for SimulationError {
    fn from(e: JoinError) -> Self {
        SimulationError::TaskFailed(e.to_string())
    }
}

/// Tasks of one run.
struct Running {
    cancel: CancellationToken,
    transport_shutdown: CancellationToken,
    clock: JoinHandle<RunState>,
    tcp: JoinHandle<()>,
    udp: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
}

/// Runs one scenario.
///
/// ```ignore
/// let mut sim = Simulator::load_config(Path::new("scenario.json"))?;
/// let addr = sim.start().await?;
/// println!("serving on {addr}");
/// let status = sim.wait_finished().await?;
/// ```
pub struct Simulator {
    config: SimulationConfig,
    batches: broadcast::Sender<Batch>,
    stats: Arc<TransportStats>,
    status: Arc<watch::Sender<SimulationStatus>>,
    running: Option<Running>,
}

impl Simulator {
    /// Load and validate a scenario file.
    pub fn load_config(path: &Path) -> Result<Self, SimulationError> {
        Ok(Self::from_config(config::load_config(path)?))
    }

    pub fn from_config(config: SimulationConfig) -> Self {
        let (batches, _) = broadcast::channel(config.network.queue_capacity);
        let (status, _) = watch::channel(SimulationStatus::default());
        Self {
            config,
            batches,
            stats: Arc::new(TransportStats::new()),
            status: Arc::new(status),
            running: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// In-process subscription to every published batch.
    ///
    /// Subscribing before [`Simulator::start`] guarantees the first tick is
    /// seen. The receiver lags (drop-oldest) like any network consumer.
    pub fn subscribe(&self) -> broadcast::Receiver<Batch> {
        self.batches.subscribe()
    }

    /// Bind the outputs and start the clock. Returns the TCP address.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::AlreadyRunning`] if a run is in progress
    /// - [`SimulationError::Transport`] if the listener cannot be bound
    pub async fn start(&mut self) -> Result<SocketAddr, SimulationError> {
        if self.running.is_some() {
            return Err(SimulationError::AlreadyRunning);
        }

        let start_time = self.config.start_time.unwrap_or_else(Utc::now);
        let engine = Engine::new(&self.config, start_time)?;

        let cancel = CancellationToken::new();
        let transport_shutdown = CancellationToken::new();

        let tcp = TcpBroadcaster::bind(
            &self.config.network.bind_address(),
            self.batches.clone(),
            Arc::clone(&self.stats),
            transport_shutdown.clone(),
        )
        .await?;
        let local_addr = tcp.local_addr();

        // Subscribed before the clock starts so UDP sees the first tick
        let udp = match self.config.network.udp_target {
            Some(target) => Some(
                UdpBroadcaster::bind(
                    target,
                    self.batches.subscribe(),
                    Arc::clone(&self.stats),
                    transport_shutdown.clone(),
                )
                .await?,
            ),
            None => None,
        };

        self.status.send_replace(SimulationStatus::default());

        let clock = SimulationClock::new(
            engine,
            self.config.tick_period(),
            self.config.total_ticks(),
            ClockOutputs {
                batches: self.batches.clone(),
                status: Arc::clone(&self.status),
                transport_shutdown: transport_shutdown.clone(),
            },
            cancel.clone(),
        );

        tracing::info!(
            addr = %local_addr,
            udp = ?self.config.network.udp_target,
            protocol = %self.config.protocol,
            update_rate = self.config.update_rate,
            vessels = self.config.ais_vessels.len() + 1,
            "Simulation starting"
        );

        self.running = Some(Running {
            cancel,
            transport_shutdown,
            tcp: tcp.start(),
            udp: udp.map(UdpBroadcaster::start),
            clock: clock.start(),
            local_addr,
        });
        Ok(local_addr)
    }

    /// Stop the run and wait for every task to finish.
    ///
    /// The tick in progress completes and consumers receive what was
    /// already queued before their connections close. Also used to reap
    /// a run that finished on its own.
    pub async fn stop(&mut self) -> Result<SimulationStatus, SimulationError> {
        let running = self.running.take().ok_or(SimulationError::NotRunning)?;

        running.cancel.cancel();
        let state = running.clock.await?;
        running.transport_shutdown.cancel();
        running.tcp.await?;
        if let Some(udp) = running.udp {
            udp.await?;
        }

        let status = self.snapshot(Some(running.local_addr));
        tracing::info!(
            state = state.as_str(),
            ticks = status.ticks,
            sentences = status.sentences_emitted,
            "Simulation stopped"
        );
        Ok(status)
    }

    /// Wait until the configured duration has elapsed.
    ///
    /// Never resolves for an unbounded run; race it against a shutdown
    /// signal and call [`Simulator::stop`] afterwards.
    pub async fn wait_finished(&self) -> Result<SimulationStatus, SimulationError> {
        let running = self.running.as_ref().ok_or(SimulationError::NotRunning)?;
        let mut rx = self.status.subscribe();
        rx.wait_for(|status| status.state.is_terminal())
            .await
            .map_err(|e| SimulationError::TaskFailed(e.to_string()))?;
        Ok(self.snapshot(Some(running.local_addr)))
    }

    /// Current status.
    pub fn status(&self) -> SimulationStatus {
        self.snapshot(self.running.as_ref().map(|r| r.local_addr))
    }

    fn snapshot(&self, local_addr: Option<SocketAddr>) -> SimulationStatus {
        let mut status = self.status.borrow().clone();
        status.local_addr = local_addr;
        status.consumers = self.stats.consumers();
        status.lagged_batches = self.stats.lagged_batches();
        status.udp_errors = self.stats.udp_errors();
        status
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
            running.transport_shutdown.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DurationValue, NetworkSettings, ScenarioFile, SpeedSettings};
    use crate::nmea0183::checksum;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpStream;

    fn scenario(duration: Option<f64>, update_rate: f64) -> SimulationConfig {
        let scenario = ScenarioFile {
            network: NetworkSettings {
                port: 0,
                ..NetworkSettings::default()
            },
            update_rate,
            duration_seconds: duration.map(DurationValue::Seconds),
            waypoints: vec!["37.70,-122.30".into(), "37.75,-122.30".into()],
            speed_profile: vec![SpeedSettings {
                duration: None,
                speed: 8.0,
            }],
            ..ScenarioFile::default()
        };
        SimulationConfig::from_scenario(&scenario).unwrap()
    }

    #[tokio::test]
    async fn test_start_and_stop_over_tcp() {
        let mut sim = Simulator::from_config(scenario(None, 20.0));
        let addr = sim.start().await.unwrap();
        assert!(sim.is_running());
        assert_eq!(sim.status().local_addr, Some(addr));

        let stream = TcpStream::connect(addr).await.unwrap();
        let mut lines = tokio::io::BufReader::new(stream).lines();
        for _ in 0..10 {
            let line = lines.next_line().await.unwrap().unwrap();
            assert!(line.starts_with('$'), "unexpected line {line}");
            assert!(checksum::verify(&line), "bad checksum in {line}");
        }

        let status = sim.stop().await.unwrap();
        assert_eq!(status.state, RunState::Stopped);
        assert!(status.ticks > 0);
        assert!(!sim.is_running());
        assert_eq!(sim.status().local_addr, None);
    }

    #[tokio::test]
    async fn test_lifecycle_errors() {
        let mut sim = Simulator::from_config(scenario(None, 10.0));
        assert!(matches!(
            sim.stop().await,
            Err(SimulationError::NotRunning)
        ));
        assert!(matches!(
            sim.wait_finished().await,
            Err(SimulationError::NotRunning)
        ));

        sim.start().await.unwrap();
        assert!(matches!(
            sim.start().await,
            Err(SimulationError::AlreadyRunning)
        ));
        sim.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_fatal() {
        let mut first = Simulator::from_config(scenario(None, 10.0));
        let addr = first.start().await.unwrap();

        let mut config = scenario(None, 10.0);
        config.network.port = addr.port();
        let mut second = Simulator::from_config(config);
        assert!(matches!(
            second.start().await,
            Err(SimulationError::Transport(TransportError::Bind { .. }))
        ));
        assert!(!second.is_running());

        first.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_finishes_run() {
        let mut sim = Simulator::from_config(scenario(Some(3.0), 2.0));
        let mut rx = sim.subscribe();
        sim.start().await.unwrap();

        let status = sim.wait_finished().await.unwrap();
        assert_eq!(status.state, RunState::Finished);
        assert_eq!(status.ticks, 6);

        let mut batches = 0;
        while rx.try_recv().is_ok() {
            batches += 1;
        }
        assert_eq!(batches, 6);

        let status = sim.stop().await.unwrap();
        assert_eq!(status.state, RunState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_status() {
        let mut sim = Simulator::from_config(scenario(Some(1.0), 1.0));
        sim.start().await.unwrap();
        sim.wait_finished().await.unwrap();
        sim.stop().await.unwrap();

        sim.start().await.unwrap();
        let status = sim.wait_finished().await.unwrap();
        assert_eq!(status.ticks, 1);
        sim.stop().await.unwrap();
    }
}
