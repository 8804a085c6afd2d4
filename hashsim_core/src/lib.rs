//! hashsim Core - Proof-of-Work Mining Economics Engine
//!
//! A discrete-time model of a mining network:
//! 1. **Price**: a drifting random walk with occasional shocks
//! 2. **Miners**: myopic profit-chasers scaling hashrate with the last price move
//! 3. **Lottery**: block discovery with probability `hashrate / difficulty`,
//!    won in proportion to hashrate share
//! 4. **Difficulty**: a proportional retarget every N blocks toward a target block time
//!
//! All randomness comes from one [`hashsim_env::RandomSource`], so a run is
//! reproducible from its seed.

pub mod config;
pub mod error;
pub mod price;
pub mod miner;
pub mod discovery;
pub mod difficulty;
pub mod reward;
pub mod ledger;
pub mod snapshot;
pub mod model;

// Re-export key types for convenience
pub use config::{AdaptationRule, ModelConfig};
pub use error::ConfigError;
pub use model::{Model, NetworkState, StepOutcome};
pub use snapshot::{MinerSnapshot, ModelSnapshot};
pub use ledger::RunLedger;
pub use difficulty::Retarget;
