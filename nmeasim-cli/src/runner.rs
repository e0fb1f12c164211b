//! CLI runner for common setup.
//!
//! Owns the logging guard and builds the async runtime the simulation runs
//! on, so command handlers only deal with their own logic.

use tokio::runtime::Runtime;
use tracing::info;

use nmeasim::logging::{init_logging, LogOptions, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    logging_guard: LoggingGuard,
}

impl CliRunner {
    /// Initialize logging at `level` (`debug` forces debug).
    pub fn new(level: Option<&str>, debug: bool) -> Result<Self, CliError> {
        let mut options = LogOptions::default();
        if debug {
            options.level = "debug".to_string();
        } else if let Some(level) = level {
            options.level = level.to_string();
        }

        let logging_guard = init_logging(&options).map_err(CliError::LoggingInit)?;
        Ok(Self { logging_guard })
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = nmeasim::VERSION,
            command,
            log_file = %self.logging_guard.path().display(),
            "nmeasim starting"
        );
    }

    /// Multi-threaded runtime for the simulation tasks.
    pub fn runtime(&self) -> Result<Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("nmeasim")
            .build()
            .map_err(CliError::Runtime)
    }
}
