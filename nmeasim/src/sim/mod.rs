//! The simulation core: engine, clock and the [`Simulator`] facade.
//!
//! ```text
//! Simulator::start()
//!   ├─ Engine          vessels + encoders, one tick = one Batch
//!   ├─ SimulationClock fixed-period loop, publishes Batch + status
//!   ├─ TcpBroadcaster  fan-out to TCP consumers
//!   └─ UdpBroadcaster  optional datagram output
//! ```
//!
//! Encoding happens once per tick on the clock task; consumers share the
//! same `Arc<[EncodedSentence]>` batch.

mod clock;
mod engine;
mod output;
mod simulator;
mod status;

pub use clock::{ClockOutputs, SimulationClock};
pub use engine::{Engine, TickOutput};
pub use output::{Batch, EncodedSentence, OutputKind, Source};
pub use simulator::{SimulationError, Simulator};
pub use status::{RunState, SimulationStatus};
