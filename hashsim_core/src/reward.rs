//! Block reward crediting.

use crate::miner::Miner;

/// Credits block rewards to winning miners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardDistributor {
    block_subsidy: f64,
}

impl RewardDistributor {
    pub fn new(block_subsidy: f64) -> Self {
        Self { block_subsidy }
    }

    /// Adds `block_subsidy * price` to the winner and returns the amount.
    pub fn credit(&self, winner: &mut Miner, price: f64) -> f64 {
        let reward = self.block_subsidy * price;
        winner.cumulative_reward += reward;
        winner.blocks_won += 1;
        reward
    }
}
