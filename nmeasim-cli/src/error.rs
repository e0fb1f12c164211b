//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use nmeasim::config::ConfigError;
use nmeasim::sim::SimulationError;
use nmeasim::transport::TransportError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Scenario could not be loaded or validated
    Config(ConfigError),
    /// Simulation failed to start or stop cleanly
    Simulation(SimulationError),
    /// Failed to install the Ctrl+C handler
    Signal(String),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Simulation(SimulationError::Transport(TransportError::Bind { .. })) =
            self
        {
            eprintln!();
            eprintln!("Another process may be using the port. Try --port <PORT>.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Simulation(e) => write!(f, "Simulation error: {}", e),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Simulation(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Signal(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<SimulationError> for CliError {
    fn from(e: SimulationError) -> Self {
        match e {
            SimulationError::Config(e) => CliError::Config(e),
            other => CliError::Simulation(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_simulation_config_error_is_flattened() {
        let err: CliError =
            SimulationError::Config(ConfigError::invalid("update_rate", 0.0, "must be positive"))
                .into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
        assert!(err.to_string().contains("update_rate"));
    }

    #[test]
    fn test_source_chain() {
        let err = CliError::FileWrite {
            path: "out.json".to_string(),
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to write file 'out.json': denied");
        assert!(err.source().is_some());
        assert!(CliError::Signal("busy".into()).source().is_none());
    }
}
