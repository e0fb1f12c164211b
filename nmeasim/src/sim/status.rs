//! Point-in-time view of a simulation.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::vessel::VesselState;

/// Lifecycle state of a simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    /// Configured but never started.
    #[default]
    Idle,
    Running,
    /// The configured duration elapsed.
    Finished,
    /// Stopped on request.
    Stopped,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Finished => "finished",
            RunState::Stopped => "stopped",
        }
    }

    /// True once the clock has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finished | RunState::Stopped)
    }
}

/// Snapshot returned by [`super::Simulator::status`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStatus {
    pub state: RunState,
    /// Completed ticks.
    pub ticks: u64,
    /// Simulated time since the start.
    pub elapsed: Duration,
    /// Simulated UTC of the last tick.
    pub sim_time: Option<DateTime<Utc>>,
    /// Own-ship state after the last tick.
    pub own_ship: Option<VesselState>,
    /// Records published to the transport.
    pub sentences_emitted: u64,
    /// Records that failed to encode and were skipped.
    pub encode_errors: u64,
    /// Ticks that started later than one period after their schedule.
    pub overruns: u64,
    /// Address the TCP listener is bound to.
    pub local_addr: Option<SocketAddr>,
    /// TCP consumers currently connected.
    pub consumers: usize,
    /// Batches dropped for lagging consumers.
    pub lagged_batches: u64,
    /// Failed UDP sends.
    pub udp_errors: u64,
}
