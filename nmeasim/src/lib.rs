//! nmeasim - marine vessel simulator emitting NMEA 0183, AIS and NMEA 2000
//!
//! A scenario describes an own ship following a waypoint route under a
//! speed profile, plus AIS traffic moving by dead reckoning. Each tick
//! the vessels are advanced and their state is encoded; the resulting
//! batch is broadcast to every TCP consumer (and optionally a UDP target).
//!
//! # High-Level API
//!
//! ```ignore
//! use nmeasim::sim::Simulator;
//!
//! let mut sim = Simulator::load_config(Path::new("scenario.json"))?;
//! let addr = sim.start().await?;
//! // ... consumers connect to `addr` ...
//! let status = sim.stop().await?;
//! ```
//!
//! # Layout
//!
//! - [`coord`], [`route`], [`vessel`] - geodesy, routes and kinematics
//! - [`nmea0183`], [`ais`], [`nmea2000`] - encoders
//! - [`sim`] - engine, clock and the [`sim::Simulator`] facade
//! - [`transport`] - TCP fan-out and UDP output
//! - [`config`] - JSON scenario files and validation

pub mod ais;
pub mod config;
pub mod coord;
pub mod environment;
pub mod error;
pub mod logging;
pub mod nmea0183;
pub mod nmea2000;
pub mod route;
pub mod sim;
pub mod transport;
pub mod vessel;

/// Version of the nmeasim library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
