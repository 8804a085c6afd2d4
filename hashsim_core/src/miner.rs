//! Miners and the hashrate adaptation rule.

use crate::config::{AdaptationRule, ModelConfig};
use hashsim_env::{MinerId, RandomSource};
use serde::{Deserialize, Serialize};

/// Inclusive hashrate bounds applied after every adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HashrateBounds {
    pub min: f64,
    pub max: f64,
}

impl HashrateBounds {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            min: config.min_hashrate,
            max: config.max_hashrate,
        }
    }

    pub fn clamp(&self, hashrate: f64) -> f64 {
        hashrate.clamp(self.min, self.max)
    }
}

/// Computes a miner's next hashrate from the latest fractional price move.
///
/// Myopic profit-chasing: up-moves scale hashrate up, down-moves scale it
/// down, by `sensitivity * delta` capped at `max_step` either way. Moves
/// within the dead band and non-finite deltas leave hashrate unchanged.
pub fn adapted_hashrate(
    hashrate: f64,
    price_delta: f64,
    rule: &AdaptationRule,
    bounds: &HashrateBounds,
) -> f64 {
    if !price_delta.is_finite() || price_delta.abs() <= rule.dead_band {
        return hashrate;
    }

    let step = (rule.sensitivity * price_delta).clamp(-rule.max_step, rule.max_step);
    bounds.clamp(hashrate * (1.0 + step))
}

/// One mining participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Miner {
    /// Stable identifier
    pub id: MinerId,

    /// Current hashrate within the configured bounds (0 = inactive)
    pub hashrate: f64,

    /// Total value earned, non-decreasing
    pub cumulative_reward: f64,

    /// Number of blocks this miner has found
    pub blocks_won: u64,
}

impl Miner {
    /// Creates a miner with the hashrate clamped into `bounds`.
    pub fn new(id: MinerId, hashrate: f64, bounds: &HashrateBounds) -> Self {
        Self {
            id,
            hashrate: bounds.clamp(hashrate),
            cumulative_reward: 0.0,
            blocks_won: 0,
        }
    }

    /// Rescales hashrate in response to the latest price move.
    pub fn adapt(&mut self, price_delta: f64, rule: &AdaptationRule, bounds: &HashrateBounds) {
        self.hashrate = adapted_hashrate(self.hashrate, price_delta, rule, bounds);
    }

    /// Returns true if the miner contributes any hashrate.
    pub fn is_active(&self) -> bool {
        self.hashrate > 0.0
    }
}

/// Creates the initial population, drawing hashrates uniformly in id order.
pub fn spawn_population<R: RandomSource + ?Sized>(config: &ModelConfig, rng: &mut R) -> Vec<Miner> {
    let bounds = HashrateBounds::from_config(config);
    let (low, high) = config.initial_hashrate_range;

    (0..config.miner_count)
        .map(|i| {
            let hashrate = rng.uniform_in(low, high);
            Miner::new(MinerId(i as u32), hashrate, &bounds)
        })
        .collect()
}

/// Sum of all miners' hashrates.
pub fn network_hashrate(miners: &[Miner]) -> f64 {
    miners.iter().map(|m| m.hashrate).sum()
}
