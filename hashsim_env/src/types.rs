//! Common types for the hashsim environment abstraction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a miner, unique within a run.
///
/// Miners are numbered `0..miner_count` in creation order and keep their id
/// for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinerId(pub u32);

impl MinerId {
    /// Returns the id as a collection index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MinerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "miner-{}", self.0)
    }
}
