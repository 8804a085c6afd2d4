//! Error types for the hashsim harness.

use hashsim_core::ConfigError;
use thiserror::Error;

/// Errors surfaced by the harness and CLI.
#[derive(Debug, Error)]
pub enum SimError {
    /// Model configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Reading a config file or writing an export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file or export could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scenario name not recognised
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// `--export` was combined with more than one scenario
    #[error("--export only supports a single scenario, not 'all'")]
    ExportNeedsSingleScenario,
}
