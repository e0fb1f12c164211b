//! Logging setup for the simulator.
//!
//! - Writes to `<log_dir>/nmeasim.log`, truncated at the start of each run
//! - Optionally mirrors to stdout (off when stdout carries NMEA output)
//! - `RUST_LOG` overrides the level chosen on the command line or in the
//!   scenario's `network.log_level`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default directory for log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "nmeasim.log";

/// Level used when neither `RUST_LOG` nor the caller picks one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub log_dir: PathBuf,
    pub log_file: String,
    /// Level name such as `info` or `debug`.
    pub level: String,
    pub stdout: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_file: DEFAULT_LOG_FILE.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
            stdout: true,
        }
    }
}

/// Keeps the non-blocking file writer alive; dropping it flushes the log.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// If the log directory cannot be created or the log file truncated.
pub fn init_logging(options: &LogOptions) -> Result<LoggingGuard, io::Error> {
    let path = prepare_log_file(&options.log_dir, &options.log_file)?;

    let file_appender = tracing_appender::rolling::never(&options.log_dir, &options.log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = options.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&options.level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        path,
    })
}

/// Create the directory and empty the log file.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file);
    fs::write(&path, "")?;
    Ok(path)
}

/// Filter for `level`: our crates at that level, dependencies at `warn`
/// unless tracing everything.
fn filter_directive(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" => "trace".to_string(),
        "" => format!("warn,nmeasim={0},nmeasim_cli={0}", DEFAULT_LOG_LEVEL),
        _ => format!("warn,nmeasim={0},nmeasim_cli={0}", level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LogOptions::default();
        assert_eq!(options.log_dir, PathBuf::from("logs"));
        assert_eq!(options.log_file, "nmeasim.log");
        assert_eq!(options.level, "info");
        assert!(options.stdout);
    }

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("deep").join("logs");

        let path = prepare_log_file(&dir, "sim.log").unwrap();

        assert_eq!(path, dir.join("sim.log"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_prepare_truncates_previous_run() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nmeasim.log");
        fs::write(&path, "old session").unwrap();

        prepare_log_file(temp.path(), "nmeasim.log").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_prepare_fails_when_directory_is_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("logs");
        fs::write(&blocker, "not a directory").unwrap();

        assert!(prepare_log_file(&blocker, "nmeasim.log").is_err());
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(
            filter_directive("debug"),
            "warn,nmeasim=debug,nmeasim_cli=debug"
        );
        assert_eq!(
            filter_directive(" INFO "),
            "warn,nmeasim=info,nmeasim_cli=info"
        );
        assert_eq!(filter_directive("trace"), "trace");
        assert_eq!(filter_directive(""), "warn,nmeasim=info,nmeasim_cli=info");
        assert!(EnvFilter::try_new(filter_directive("warn")).is_ok());
    }
}
