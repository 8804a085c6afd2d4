//! Error types for model construction.

use thiserror::Error;

/// Invalid construction parameters.
///
/// Raised once by [`crate::ModelConfig::validate`] (and therefore by
/// [`crate::Model::new`]); a model that was built never produces one.
/// Degenerate runtime states such as zero network hashrate or a clamped
/// difficulty are not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The population must contain at least one miner
    #[error("Miner count must be positive")]
    NoMiners,

    /// A parameter that must be strictly positive was not
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// A parameter that must be non-negative was negative
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// NaN or infinity where a finite number is required
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// A range whose lower end exceeds its upper end
    #[error("{field} range is inverted: [{low}, {high}]")]
    InvalidRange {
        field: &'static str,
        low: f64,
        high: f64,
    },

    /// A probability outside `[0, 1]`
    #[error("{field} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    /// A block-count interval of zero
    #[error("{field} must be at least one block")]
    ZeroInterval { field: &'static str },
}

impl ConfigError {
    /// Returns the name of the offending parameter.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NoMiners => "miner_count",
            Self::NonPositive { field, .. }
            | Self::Negative { field, .. }
            | Self::NotFinite { field, .. }
            | Self::InvalidRange { field, .. }
            | Self::ProbabilityOutOfRange { field, .. }
            | Self::ZeroInterval { field } => field,
        }
    }
}
