//! Block discovery: the per-step mining lottery.

use crate::miner::{network_hashrate, Miner};
use hashsim_env::{MinerId, RandomSource};

/// Samples whether a block is found in a step and who found it.
///
/// The find probability is `network_hashrate / difficulty`, capped at 1.
/// Given a find, the winner is drawn proportionally to each miner's share
/// of the network hashrate. Nothing is carried between steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockDiscoveryEngine;

impl BlockDiscoveryEngine {
    pub fn new() -> Self {
        Self
    }

    /// Probability of finding a block this step.
    pub fn find_probability(network_hashrate: f64, difficulty: f64) -> f64 {
        if network_hashrate <= 0.0 {
            0.0
        } else {
            (network_hashrate / difficulty).min(1.0)
        }
    }

    /// Runs the lottery for one step.
    ///
    /// Consumes exactly one uniform draw when the network has hashrate and
    /// none when it does not. The draw decides both the find (`u < p`) and
    /// the winner: conditioned on a find, `u / p` is again uniform on
    /// `[0, 1)`, so it is reused as the roll for weighted selection.
    pub fn sample<R: RandomSource + ?Sized>(
        &self,
        miners: &[Miner],
        difficulty: f64,
        rng: &mut R,
    ) -> Option<MinerId> {
        let total = network_hashrate(miners);
        if total <= 0.0 {
            return None;
        }

        let p = Self::find_probability(total, difficulty);
        let u = rng.next_uniform();
        if u >= p {
            return None;
        }

        select_weighted(miners, total, u / p)
    }
}

/// Picks a miner with probability proportional to its hashrate.
///
/// `roll` must be in `[0, 1)`. Miners with zero hashrate are never picked.
pub fn select_weighted(miners: &[Miner], total: f64, roll: f64) -> Option<MinerId> {
    let target = roll * total;
    let mut cumulative = 0.0;
    let mut last_active = None;

    for miner in miners {
        if miner.hashrate <= 0.0 {
            continue;
        }
        cumulative += miner.hashrate;
        last_active = Some(miner.id);
        if cumulative > target {
            return Some(miner.id);
        }
    }

    // Rounding can leave the final cumulative sum a hair below target.
    last_active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::HashrateBounds;
    use hashsim_env::{ReplaySource, SeededSource};

    fn population(hashrates: &[f64]) -> Vec<Miner> {
        let bounds = HashrateBounds { min: 0.0, max: 1_000.0 };
        hashrates
            .iter()
            .enumerate()
            .map(|(i, h)| Miner::new(MinerId(i as u32), *h, &bounds))
            .collect()
    }

    #[test]
    fn test_zero_hashrate_never_finds() {
        let miners = population(&[0.0, 0.0, 0.0]);
        let engine = BlockDiscoveryEngine::new();
        let mut rng = ReplaySource::constant(0.0);

        for _ in 0..1_000 {
            assert_eq!(engine.sample(&miners, 1.0, &mut rng), None);
        }
        assert_eq!(rng.uniform_draws(), 0);
    }

    #[test]
    fn test_probability_capped_at_one() {
        assert_eq!(BlockDiscoveryEngine::find_probability(500.0, 100.0), 1.0);
        assert_eq!(BlockDiscoveryEngine::find_probability(25.0, 100.0), 0.25);
        assert_eq!(BlockDiscoveryEngine::find_probability(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_draw_above_probability_finds_nothing() {
        let miners = population(&[10.0, 10.0]);
        let engine = BlockDiscoveryEngine::new();
        let mut rng = ReplaySource::constant(0.25);

        // p = 20 / 100 = 0.2
        assert_eq!(engine.sample(&miners, 100.0, &mut rng), None);
    }

    #[test]
    fn test_winner_from_rescaled_draw() {
        let miners = population(&[10.0, 30.0, 60.0]);
        let engine = BlockDiscoveryEngine::new();

        // p = 0.5; u = 0.1 -> roll 0.2 -> target 20 -> second miner
        let mut rng = ReplaySource::constant(0.1);
        assert_eq!(engine.sample(&miners, 200.0, &mut rng), Some(MinerId(1)));

        // u = 0.45 -> roll 0.9 -> target 90 -> third miner
        let mut rng = ReplaySource::constant(0.45);
        assert_eq!(engine.sample(&miners, 200.0, &mut rng), Some(MinerId(2)));
    }

    #[test]
    fn test_zero_hashrate_miner_never_wins() {
        let miners = population(&[0.0, 5.0, 0.0, 5.0]);
        for roll in [0.0, 0.25, 0.5, 0.75, 0.999_999] {
            let winner = select_weighted(&miners, 10.0, roll).unwrap();
            assert!(winner == MinerId(1) || winner == MinerId(3));
        }
    }

    #[test]
    fn test_weighted_selection_converges_to_shares() {
        let miners = population(&[10.0, 30.0, 60.0]);
        let engine = BlockDiscoveryEngine::new();
        let mut rng = SeededSource::new(2024);
        let trials = 100_000;
        let mut wins = [0usize; 3];

        // difficulty == network hashrate forces p = 1
        for _ in 0..trials {
            let winner = engine.sample(&miners, 100.0, &mut rng).unwrap();
            wins[winner.index()] += 1;
        }

        let expected = [0.10, 0.30, 0.60];
        for (count, share) in wins.iter().zip(expected) {
            let observed = *count as f64 / trials as f64;
            assert!((observed - share).abs() < 0.01, "observed {observed}, expected {share}");
        }
    }

    #[test]
    fn test_find_rate_matches_probability() {
        let miners = population(&[1.0, 1.0, 2.0]);
        let engine = BlockDiscoveryEngine::new();
        let mut rng = SeededSource::new(5);
        let trials = 50_000;

        let found = (0..trials)
            .filter(|_| engine.sample(&miners, 40.0, &mut rng).is_some())
            .count();
        let rate = found as f64 / trials as f64;
        assert!((rate - 0.1).abs() < 0.01);
    }
}
