//! Error types for the simulation runner.

use paddock_core::ConfigError;
use thiserror::Error;

/// Errors that stop a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected before any agent was started
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Frame output failed; agents were shut down first
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
