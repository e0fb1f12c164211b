//! Route following and speed scheduling.
//!
//! # Architecture
//!
//! ```text
//! SpeedProfile ──speed_at(elapsed)──┐
//!                                   ▼
//!                        distance = speed × dt
//!                                   │
//!                                   ▼
//! RouteTracker ──advance(distance)──► Advance { position, heading, legs_completed }
//! ```
//!
//! Both halves are pure state machines with no I/O. The vessel model in
//! [`crate::vessel`] composes them once per tick.

mod profile;
mod tracker;

pub use profile::{SpeedProfile, SpeedSegment};
pub use tracker::{Advance, EndOfRoute, Leg, Route, RouteTracker, ARRIVAL_RADIUS_NM};
