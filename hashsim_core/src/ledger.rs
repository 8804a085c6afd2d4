//! Run-level accounting.
//!
//! Counters the model updates once per step: blocks, retargets, shocks,
//! degenerate steps and the total reward issued. The reward total is the
//! reference for the conservation check (miners' rewards must sum to it).

use serde::{Deserialize, Serialize};

/// Aggregate statistics for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLedger {
    /// Steps executed
    pub steps: u64,

    /// Blocks found
    pub blocks_found: u64,

    /// Retargets performed
    pub retargets: u64,

    /// Retargets that hit a difficulty bound
    pub clamped_retargets: u64,

    /// Steps in which a price shock fired
    pub shocks: u64,

    /// Steps in which the price floor was applied
    pub floored_prices: u64,

    /// Steps with zero network hashrate
    pub idle_steps: u64,

    /// Sum of every reward credited
    pub total_reward_issued: f64,

    /// Lowest price seen, including the initial price
    pub min_price: f64,

    /// Highest price seen, including the initial price
    pub max_price: f64,

    /// Step index of the most recent block (0 if none)
    pub last_block_step: u64,
}

impl RunLedger {
    pub fn new(initial_price: f64) -> Self {
        Self {
            steps: 0,
            blocks_found: 0,
            retargets: 0,
            clamped_retargets: 0,
            shocks: 0,
            floored_prices: 0,
            idle_steps: 0,
            total_reward_issued: 0.0,
            min_price: initial_price,
            max_price: initial_price,
            last_block_step: 0,
        }
    }

    pub(crate) fn record_price(&mut self, price: f64, shocked: bool, floored: bool) {
        self.steps += 1;
        self.min_price = self.min_price.min(price);
        self.max_price = self.max_price.max(price);
        if shocked {
            self.shocks += 1;
        }
        if floored {
            self.floored_prices += 1;
        }
    }

    pub(crate) fn record_block(&mut self, step: u64, reward: f64) {
        self.blocks_found += 1;
        self.total_reward_issued += reward;
        self.last_block_step = step;
    }

    pub(crate) fn record_retarget(&mut self, clamped: bool) {
        self.retargets += 1;
        if clamped {
            self.clamped_retargets += 1;
        }
    }

    pub(crate) fn record_idle(&mut self) {
        self.idle_steps += 1;
    }

    /// Average steps per block from the start of the run to the last block.
    pub fn mean_block_time(&self) -> Option<f64> {
        if self.blocks_found == 0 {
            None
        } else {
            Some(self.last_block_step as f64 / self.blocks_found as f64)
        }
    }

    /// Fraction of steps that produced a block.
    pub fn block_rate(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.blocks_found as f64 / self.steps as f64
        }
    }
}
