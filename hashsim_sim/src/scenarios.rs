//! Named parameter presets for the harness.

use crate::error::SimError;
use hashsim_core::ModelConfig;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// HS-001: Default parameters
    Baseline,

    /// HS-002: Sustained rally with upside shocks
    BullRun,

    /// HS-003: Falling market with frequent downside shocks
    Crash,

    /// HS-004: High noise, wide shocks in both directions
    Volatile,

    /// HS-005: Retarget every 5 blocks
    FastRetarget,

    /// HS-006: Every miner starts at zero hashrate
    IdleNetwork,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Baseline,
            ScenarioId::BullRun,
            ScenarioId::Crash,
            ScenarioId::Volatile,
            ScenarioId::FastRetarget,
            ScenarioId::IdleNetwork,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "baseline",
            ScenarioId::BullRun => "bull_run",
            ScenarioId::Crash => "crash",
            ScenarioId::Volatile => "volatile",
            ScenarioId::FastRetarget => "fast_retarget",
            ScenarioId::IdleNetwork => "idle_network",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "Default drift, noise and shocks; retarget every 50 blocks",
            ScenarioId::BullRun => "+2% drift per step with occasional upside shocks",
            ScenarioId::Crash => "-2% drift per step, 20% chance of a downside shock",
            ScenarioId::Volatile => "25% noise, shocks of up to 60% either way",
            ScenarioId::FastRetarget => "Retarget every 5 blocks toward the same target time",
            ScenarioId::IdleNetwork => "All miners at zero hashrate: no block may ever be found",
        }
    }

    /// Layers this scenario's parameters over a base configuration.
    pub fn apply(&self, base: ModelConfig) -> ModelConfig {
        let drift = base.drift;
        let noise = base.noise_std_dev;
        let target = base.target_block_time;
        let max_hashrate = base.max_hashrate;

        match self {
            ScenarioId::Baseline => base,
            ScenarioId::BullRun => base
                .with_price_process(0.02, noise)
                .with_shocks(0.05, 0.0, 0.3),
            ScenarioId::Crash => base
                .with_price_process(-0.02, noise)
                .with_shocks(0.2, -0.5, 0.0),
            ScenarioId::Volatile => base
                .with_price_process(drift, 0.25)
                .with_shocks(0.25, -0.6, 0.6),
            ScenarioId::FastRetarget => base.with_retarget(5, target),
            ScenarioId::IdleNetwork => base.with_hashrate((0.0, 0.0), 0.0, max_hashrate),
        }
    }

    /// Returns true if the scenario must end with no blocks found.
    pub fn expects_no_blocks(&self) -> bool {
        matches!(self, ScenarioId::IdleNetwork)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" | "hs-001" => Ok(ScenarioId::Baseline),
            "bull_run" | "bullrun" | "hs-002" => Ok(ScenarioId::BullRun),
            "crash" | "hs-003" => Ok(ScenarioId::Crash),
            "volatile" | "hs-004" => Ok(ScenarioId::Volatile),
            "fast_retarget" | "fastretarget" | "hs-005" => Ok(ScenarioId::FastRetarget),
            "idle_network" | "idlenetwork" | "hs-006" => Ok(ScenarioId::IdleNetwork),
            _ => Err(SimError::UnknownScenario(s.to_string())),
        }
    }
}
