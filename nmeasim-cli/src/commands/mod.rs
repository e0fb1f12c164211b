//! CLI command implementations.
//!
//! - [`run`] - Run a scenario (main command)
//! - [`validate`] - Check a scenario file
//! - [`example`] - Print or save the built-in scenario

pub mod example;
pub mod run;
pub mod validate;
