//! Example command - emit the built-in San Francisco Bay scenario.

use std::path::Path;

use nmeasim::config::{ConfigError, ScenarioFile};

use crate::error::CliError;

/// Print the example scenario, or save it to `output`.
pub fn run(output: Option<&Path>) -> Result<(), CliError> {
    let scenario = ScenarioFile::example();

    match output {
        Some(path) => {
            scenario.save_to(path).map_err(|e| match e {
                ConfigError::Write { path, source } => CliError::FileWrite {
                    path: path.display().to_string(),
                    error: source,
                },
                other => CliError::Config(other),
            })?;
            println!("Wrote example scenario to {}", path.display());
        }
        None => println!("{}", scenario.to_json()?),
    }
    Ok(())
}
