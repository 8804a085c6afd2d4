//! Difficulty retargeting.
//!
//! A proportional controller: every `interval` blocks, the observed average
//! block time over the window that just closed is compared with the target,
//! and difficulty is scaled by `target / observed`. There is no smoothing
//! and no memory of earlier windows.

use crate::config::ModelConfig;

/// Outcome of a retarget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retarget {
    /// Difficulty before the retarget
    pub previous: f64,

    /// New difficulty, within the configured bounds
    pub difficulty: f64,

    /// Average steps per block over the window
    pub observed_block_time: f64,

    /// Whether a bound was hit
    pub clamped: bool,
}

/// Owns the retarget rule and its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyController {
    target_block_time: f64,
    interval: u64,
    min_difficulty: f64,
    max_difficulty: Option<f64>,
}

impl DifficultyController {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            target_block_time: config.target_block_time,
            interval: config.retarget_interval,
            min_difficulty: config.min_difficulty,
            max_difficulty: config.max_difficulty,
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn target_block_time(&self) -> f64 {
        self.target_block_time
    }

    /// Returns true if a block at `height` closes a retarget window.
    pub fn is_retarget_height(&self, height: u64) -> bool {
        height > 0 && height % self.interval == 0
    }

    /// Computes the next difficulty from the window that just closed.
    ///
    /// `window` holds the step indices of the last `interval` blocks in
    /// order; `anchor` is the step index at which the previous window closed
    /// (0 for the first window). Returns `None` when fewer than `interval`
    /// blocks are available or the observed time is not positive.
    pub fn retarget(&self, current: f64, window: &[u64], anchor: u64) -> Option<Retarget> {
        if (window.len() as u64) < self.interval {
            return None;
        }
        let last = *window.last()?;
        let elapsed = last.checked_sub(anchor)?;
        let observed = elapsed as f64 / self.interval as f64;
        if observed <= 0.0 {
            return None;
        }

        let raw = current * self.target_block_time / observed;
        let difficulty = self.clamp(raw);

        Some(Retarget {
            previous: current,
            difficulty,
            observed_block_time: observed,
            clamped: difficulty != raw,
        })
    }

    fn clamp(&self, difficulty: f64) -> f64 {
        if difficulty.is_nan() {
            return self.min_difficulty;
        }
        if difficulty.is_infinite() {
            return self.max_difficulty.unwrap_or(f64::MAX);
        }
        let floored = difficulty.max(self.min_difficulty);
        match self.max_difficulty {
            Some(max) => floored.min(max),
            None => floored,
        }
    }
}
