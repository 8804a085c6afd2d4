//! Model configuration and construction-time validation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How a miner rescales its hashrate in response to the latest price move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationRule {
    /// Multiplier applied to the fractional price change (default: 1.0)
    pub sensitivity: f64,

    /// Largest fractional hashrate change in one step (default: 0.05)
    pub max_step: f64,

    /// Price moves with magnitude at or below this fraction are ignored (default: 0.0)
    pub dead_band: f64,
}

impl Default for AdaptationRule {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            max_step: 0.05,
            dead_band: 0.0,
        }
    }
}

/// Configuration for a model run.
///
/// All fields are checked by [`ModelConfig::validate`] before a model is
/// built. Missing fields in a JSON config take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of miners in the population (fixed for the run)
    pub miner_count: usize,

    /// Uniform range the initial per-miner hashrate is drawn from
    pub initial_hashrate_range: (f64, f64),

    /// Lower hashrate bound; 0 allows miners to go inactive
    pub min_hashrate: f64,

    /// Upper hashrate bound
    pub max_hashrate: f64,

    /// Hashrate response to price moves
    pub adaptation: AdaptationRule,

    /// Price at step 0
    pub initial_price: f64,

    /// Strictly positive lower bound on the price
    pub price_floor: f64,

    /// Deterministic per-step growth term
    pub drift: f64,

    /// Standard deviation of the per-step gaussian noise
    pub noise_std_dev: f64,

    /// Per-step probability of a price shock
    pub shock_probability: f64,

    /// Uniform range a shock's fractional magnitude is drawn from
    pub shock_range: (f64, f64),

    /// Difficulty at step 0
    pub initial_difficulty: f64,

    /// Strictly positive lower bound on the difficulty
    pub min_difficulty: f64,

    /// Optional upper bound on the difficulty
    pub max_difficulty: Option<f64>,

    /// Desired average number of steps between blocks
    pub target_block_time: f64,

    /// Number of blocks between difficulty retargets
    pub retarget_interval: u64,

    /// Reward units granted per block, paid at the current price
    pub block_subsidy: f64,

    /// Seed for the random source (None = draw one from OS entropy)
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            miner_count: 25,
            initial_hashrate_range: (0.8, 1.2),
            min_hashrate: 0.01,
            max_hashrate: 100.0,
            adaptation: AdaptationRule::default(),
            initial_price: 1.0,
            price_floor: 0.01,
            drift: 0.001,
            noise_std_dev: 0.05,
            shock_probability: 0.1,
            shock_range: (-0.2, 0.2),
            initial_difficulty: 250.0,
            min_difficulty: 1.0,
            max_difficulty: None,
            target_block_time: 10.0,
            retarget_interval: 50,
            block_subsidy: 6.25,
            seed: None,
        }
    }
}

impl ModelConfig {
    /// Sets the number of miners.
    pub fn with_miners(mut self, miner_count: usize) -> Self {
        self.miner_count = miner_count;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the retarget cadence and target block time.
    pub fn with_retarget(mut self, interval: u64, target_block_time: f64) -> Self {
        self.retarget_interval = interval;
        self.target_block_time = target_block_time;
        self
    }

    /// Sets the price process parameters.
    pub fn with_price_process(mut self, drift: f64, noise_std_dev: f64) -> Self {
        self.drift = drift;
        self.noise_std_dev = noise_std_dev;
        self
    }

    /// Sets shock probability and magnitude range.
    pub fn with_shocks(mut self, probability: f64, low: f64, high: f64) -> Self {
        self.shock_probability = probability;
        self.shock_range = (low, high);
        self
    }

    /// Sets initial hashrate range and bounds.
    pub fn with_hashrate(mut self, initial: (f64, f64), min: f64, max: f64) -> Self {
        self.initial_hashrate_range = initial;
        self.min_hashrate = min;
        self.max_hashrate = max;
        self
    }

    /// Checks every parameter, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.miner_count == 0 {
            return Err(ConfigError::NoMiners);
        }

        let (hr_low, hr_high) = self.initial_hashrate_range;
        non_negative("initial_hashrate_range.low", hr_low)?;
        finite("initial_hashrate_range.high", hr_high)?;
        ordered("initial_hashrate_range", hr_low, hr_high)?;
        non_negative("min_hashrate", self.min_hashrate)?;
        positive("max_hashrate", self.max_hashrate)?;
        ordered("hashrate bounds", self.min_hashrate, self.max_hashrate)?;

        non_negative("adaptation.sensitivity", self.adaptation.sensitivity)?;
        non_negative("adaptation.max_step", self.adaptation.max_step)?;
        if self.adaptation.max_step >= 1.0 {
            return Err(ConfigError::InvalidRange {
                field: "adaptation.max_step",
                low: self.adaptation.max_step,
                high: 1.0,
            });
        }
        non_negative("adaptation.dead_band", self.adaptation.dead_band)?;

        positive("initial_price", self.initial_price)?;
        positive("price_floor", self.price_floor)?;
        ordered("initial_price", self.price_floor, self.initial_price)?;
        finite("drift", self.drift)?;
        non_negative("noise_std_dev", self.noise_std_dev)?;
        probability("shock_probability", self.shock_probability)?;
        let (shock_low, shock_high) = self.shock_range;
        finite("shock_range.low", shock_low)?;
        finite("shock_range.high", shock_high)?;
        ordered("shock_range", shock_low, shock_high)?;

        positive("initial_difficulty", self.initial_difficulty)?;
        positive("min_difficulty", self.min_difficulty)?;
        if let Some(max) = self.max_difficulty {
            positive("max_difficulty", max)?;
            ordered("difficulty bounds", self.min_difficulty, max)?;
            ordered("initial_difficulty", self.initial_difficulty, max)?;
        }
        ordered("initial_difficulty", self.min_difficulty, self.initial_difficulty)?;
        positive("target_block_time", self.target_block_time)?;
        if self.retarget_interval == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "retarget_interval",
            });
        }

        positive("block_subsidy", self.block_subsidy)?;
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn ordered(field: &'static str, low: f64, high: f64) -> Result<(), ConfigError> {
    if low <= high {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field, low, high })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ModelConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_miners_rejected() {
        let config = ModelConfig::default().with_miners(0);
        assert_eq!(config.validate(), Err(ConfigError::NoMiners));
    }

    #[test]
    fn test_non_positive_target_time_rejected() {
        let config = ModelConfig::default().with_retarget(50, 0.0);
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), "target_block_time");
        assert!(matches!(err, ConfigError::NonPositive { .. }));

        let config = ModelConfig::default().with_retarget(50, -3.0);
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_zero_retarget_interval_rejected() {
        let config = ModelConfig::default().with_retarget(0, 10.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval { field: "retarget_interval" })
        );
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let config = ModelConfig::default().with_hashrate((2.0, 1.0), 0.0, 10.0);
        assert_eq!(config.validate().unwrap_err().field(), "initial_hashrate_range");

        let config = ModelConfig::default().with_hashrate((1.0, 2.0), 5.0, 3.0);
        assert_eq!(config.validate().unwrap_err().field(), "hashrate bounds");

        let config = ModelConfig::default().with_shocks(0.1, 0.3, -0.3);
        assert_eq!(config.validate().unwrap_err().field(), "shock_range");
    }

    #[test]
    fn test_probability_and_finiteness_checked() {
        let config = ModelConfig::default().with_shocks(1.5, -0.2, 0.2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { .. })
        ));

        let config = ModelConfig::default().with_price_process(f64::NAN, 0.05);
        assert!(matches!(config.validate(), Err(ConfigError::NotFinite { field: "drift", .. })));

        let mut config = ModelConfig::default();
        config.price_floor = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { field: "price_floor", .. })));
    }

    #[test]
    fn test_zero_hashrate_population_is_valid() {
        let config = ModelConfig::default().with_hashrate((0.0, 0.0), 0.0, 10.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_error_message_names_field() {
        let config = ModelConfig::default().with_retarget(50, -1.0);
        let msg = config.validate().unwrap_err().to_string();
        assert_eq!(msg, "target_block_time must be positive, got -1");
    }

    #[test]
    fn test_start_values_must_lie_within_bounds() {
        let mut config = ModelConfig::default();
        config.price_floor = 2.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: "initial_price", low: 2.0, high: 1.0 })
        );

        let mut config = ModelConfig::default();
        config.initial_difficulty = 0.5;
        assert_eq!(config.validate().unwrap_err().field(), "initial_difficulty");

        let mut config = ModelConfig::default();
        config.max_difficulty = Some(100.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: "initial_difficulty", low: 250.0, high: 100.0 })
        );

        let mut config = ModelConfig::default();
        config.price_floor = 1.0;
        config.min_difficulty = 250.0;
        config.max_difficulty = Some(250.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_config_json_defaults_fill_missing_fields() {
        let config: ModelConfig = serde_json::from_str(r#"{"miner_count": 3, "seed": 9}"#).unwrap();
        assert_eq!(config.miner_count, 3);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.retarget_interval, 50);
    }
}
