//! Simulation clock - the tick loop task.
//!
//! The [`SimulationClock`] drives an [`Engine`] at a fixed period and
//! publishes each tick's batch on a broadcast channel.
//!
//! # Design
//!
//! - `new()` + `start()` spawns the async task
//! - `tokio::time::interval` with [`MissedTickBehavior::Burst`]: a late tick
//!   is caught up, never skipped, so simulated time stays exact
//! - A tick that starts more than one period late counts as an overrun
//! - Cancellation is checked between ticks only; a tick in progress always
//!   completes and publishes
//! - On exit the transport token is cancelled so consumers drain and close

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::engine::Engine;
use super::output::Batch;
use super::status::{RunState, SimulationStatus};

/// Channels the clock publishes on.
pub struct ClockOutputs {
    pub batches: broadcast::Sender<Batch>,
    pub status: Arc<watch::Sender<SimulationStatus>>,
    /// Cancelled when the clock stops, for whatever reason.
    pub transport_shutdown: CancellationToken,
}

/// Fixed-period tick loop.
pub struct SimulationClock {
    engine: Engine,
    period: Duration,
    total_ticks: Option<u64>,
    outputs: ClockOutputs,
    cancel: CancellationToken,
}

impl SimulationClock {
    /// Create a clock that ticks `engine` every `period` until `total_ticks`
    /// have run (or forever) or `cancel` fires.
    pub fn new(
        engine: Engine,
        period: Duration,
        total_ticks: Option<u64>,
        outputs: ClockOutputs,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            engine,
            period,
            total_ticks,
            outputs,
            cancel,
        }
    }

    /// Start the clock as an async task. Resolves to the final state.
    pub fn start(self) -> JoinHandle<RunState> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(mut self) -> RunState {
        tracing::info!(
            period_ms = self.period.as_millis() as u64,
            total_ticks = ?self.total_ticks,
            vessels = self.engine.vessels().len(),
            "Simulation clock started"
        );
        self.outputs
            .status
            .send_modify(|status| status.state = RunState::Running);

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

        let final_state = loop {
            if self
                .total_ticks
                .is_some_and(|total| self.engine.ticks() >= total)
            {
                break RunState::Finished;
            }

            let scheduled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break RunState::Stopped,
                scheduled = interval.tick() => scheduled,
            };

            let lateness = Instant::now().saturating_duration_since(scheduled);
            let overrun = lateness > self.period;
            if overrun {
                tracing::warn!(
                    tick = self.engine.ticks() + 1,
                    late_ms = lateness.as_millis() as u64,
                    period_ms = self.period.as_millis() as u64,
                    "Simulation tick overran its period"
                );
            }

            self.tick(overrun);
        };

        self.outputs.status.send_modify(|status| status.state = final_state);
        self.outputs.transport_shutdown.cancel();

        tracing::info!(
            ticks = self.engine.ticks(),
            state = final_state.as_str(),
            "Simulation clock stopped"
        );
        final_state
    }

    /// Run one tick and publish its batch and status.
    fn tick(&mut self, overrun: bool) {
        let out = self.engine.tick();
        let emitted = out.sentences.len() as u64;

        let batch: Batch = out.sentences.into();
        if !batch.is_empty() && self.outputs.batches.send(batch).is_err() {
            tracing::trace!(tick = self.engine.ticks(), "No consumers subscribed");
        }

        let ticks = self.engine.ticks();
        let elapsed = self.engine.elapsed();
        let sim_time = self.engine.sim_time();
        let own_ship = self.engine.own_ship().copied();
        self.outputs.status.send_modify(|status| {
            status.ticks = ticks;
            status.elapsed = elapsed;
            status.sim_time = Some(sim_time);
            status.own_ship = own_ship;
            status.sentences_emitted += emitted;
            status.encode_errors += out.encode_errors;
            status.overruns += u64::from(overrun);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScenarioFile, SimulationConfig, SpeedSettings};
    use chrono::{TimeZone, Utc};

    fn setup(
        duration: Option<f64>,
    ) -> (
        SimulationClock,
        broadcast::Receiver<Batch>,
        watch::Receiver<SimulationStatus>,
        CancellationToken,
        CancellationToken,
    ) {
        let scenario = ScenarioFile {
            waypoints: vec!["37.7,-122.3".into(), "37.8,-122.3".into()],
            speed_profile: vec![SpeedSettings {
                duration: None,
                speed: 6.0,
            }],
            duration_seconds: duration.map(crate::config::DurationValue::Seconds),
            ..ScenarioFile::default()
        };
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        let engine = Engine::new(&config, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .unwrap();

        let (batches, rx) = broadcast::channel(64);
        let (status, status_rx) = watch::channel(SimulationStatus::default());
        let cancel = CancellationToken::new();
        let transport = CancellationToken::new();
        let clock = SimulationClock::new(
            engine,
            config.tick_period(),
            config.total_ticks(),
            ClockOutputs {
                batches,
                status: Arc::new(status),
                transport_shutdown: transport.clone(),
            },
            cancel.clone(),
        );
        (clock, rx, status_rx, cancel, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_for_configured_duration() {
        let (clock, mut rx, status_rx, _cancel, transport) = setup(Some(5.0));
        let state = clock.start().await.unwrap();

        assert_eq!(state, RunState::Finished);
        assert!(transport.is_cancelled());

        let mut batches = 0;
        while let Ok(batch) = rx.try_recv() {
            assert!(!batch.is_empty());
            batches += 1;
        }
        assert_eq!(batches, 5);

        let status = status_rx.borrow().clone();
        assert_eq!(status.state, RunState::Finished);
        assert_eq!(status.ticks, 5);
        assert_eq!(status.elapsed, Duration::from_secs(5));
        assert_eq!(status.encode_errors, 0);
        assert!(status.sentences_emitted > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_between_ticks() {
        let (clock, mut rx, status_rx, cancel, transport) = setup(None);
        let handle = clock.start();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        cancel.cancel();
        let state = handle.await.unwrap();

        assert_eq!(state, RunState::Stopped);
        assert!(transport.is_cancelled());
        // Ticks at t = 0, 1 and 2 s
        assert_eq!(status_rx.borrow().ticks, 3);
        let mut batches = 0;
        while rx.try_recv().is_ok() {
            batches += 1;
        }
        assert_eq!(batches, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_time_counts_no_overruns() {
        let (clock, _rx, status_rx, _cancel, _transport) = setup(Some(30.0));
        clock.start().await.unwrap();
        assert_eq!(status_rx.borrow().overruns, 0);
        assert_eq!(status_rx.borrow().ticks, 30);
    }
}
