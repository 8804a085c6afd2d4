//! Read-only, point-in-time views of a model for observers.

use crate::miner::Miner;
use hashsim_env::MinerId;
use serde::{Deserialize, Serialize};

/// One miner in the population view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerSnapshot {
    pub id: MinerId,
    pub hashrate: f64,
    pub cumulative_reward: f64,
    pub blocks_won: u64,
    pub active: bool,
}

impl From<&Miner> for MinerSnapshot {
    fn from(miner: &Miner) -> Self {
        Self {
            id: miner.id,
            hashrate: miner.hashrate,
            cumulative_reward: miner.cumulative_reward,
            blocks_won: miner.blocks_won,
            active: miner.is_active(),
        }
    }
}

/// A consistent view of the whole model between two steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Steps executed so far
    pub step: u64,

    pub price: f64,
    pub difficulty: f64,
    pub block_height: u64,

    /// Sum of all miners' hashrates
    pub network_hashrate: f64,

    /// Miners with non-zero hashrate
    pub active_miners: usize,

    pub miners: Vec<MinerSnapshot>,
}

impl ModelSnapshot {
    /// Total reward held by all miners.
    pub fn total_reward(&self) -> f64 {
        self.miners.iter().map(|m| m.cumulative_reward).sum()
    }

    /// Serializes the snapshot as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
