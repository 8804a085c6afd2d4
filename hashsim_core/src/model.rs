//! Model - Orchestrates the price, miner, discovery and difficulty components.
//!
//! The model is the only writer of [`NetworkState`]. Components receive the
//! values they need by reference and hand back new values; the model stores
//! them.
//!
//! # Step order
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Model::step                          │
//! │                                                            │
//! │  1. PriceProcess::advance        price      -> new price   │
//! │  2. Miner::adapt (id order)      price delta -> hashrates  │
//! │  3. BlockDiscoveryEngine::sample hashrates  -> winner?     │
//! │  4. RewardDistributor::credit    winner, price             │
//! │     block_height += 1                                      │
//! │  5. DifficultyController::retarget  every N blocks         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use hashsim_core::{Model, ModelConfig};
//!
//! let mut model = Model::new(ModelConfig::default().with_seed(7)).unwrap();
//! model.run(1_000);
//!
//! let view = model.snapshot();
//! assert_eq!(view.step, 1_000);
//! assert!(view.price > 0.0 && view.difficulty > 0.0);
//! ```

use crate::config::{AdaptationRule, ModelConfig};
use crate::difficulty::{DifficultyController, Retarget};
use crate::discovery::BlockDiscoveryEngine;
use crate::error::ConfigError;
use crate::ledger::RunLedger;
use crate::miner::{network_hashrate, spawn_population, HashrateBounds, Miner};
use crate::price::PriceProcess;
use crate::reward::RewardDistributor;
use crate::snapshot::{MinerSnapshot, ModelSnapshot};

use hashsim_env::{MinerId, RandomSource, SeededSource};
use tracing::{debug, info, trace};

/// Network-wide state owned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkState {
    /// Current price, always positive
    pub price: f64,

    /// Current difficulty, always positive
    pub difficulty: f64,

    /// Blocks found so far
    pub block_height: u64,

    /// Steps executed so far
    pub step_count: u64,

    /// Step indices of the blocks in the current retarget window
    pub block_discovery_steps: Vec<u64>,

    /// Step index at which the previous retarget window closed
    pub retarget_anchor: u64,
}

impl NetworkState {
    fn initial(config: &ModelConfig) -> Self {
        Self {
            price: config.initial_price,
            difficulty: config.initial_difficulty,
            block_height: 0,
            step_count: 0,
            block_discovery_steps: Vec::with_capacity(config.retarget_interval.min(4096) as usize),
            retarget_anchor: 0,
        }
    }
}

/// What happened during one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Index of this step (1-based)
    pub step: u64,

    /// Price after the advance
    pub price: f64,

    /// Fractional price change fed to the miners
    pub price_delta: f64,

    /// Size of the price shock, if one fired
    pub shock: Option<f64>,

    /// Winner of the block found this step, if any
    pub winner: Option<MinerId>,

    /// Reward credited to the winner
    pub reward: Option<f64>,

    /// Difficulty retarget performed this step, if any
    pub retarget: Option<Retarget>,
}

impl StepOutcome {
    /// Returns true if a block was found.
    pub fn found_block(&self) -> bool {
        self.winner.is_some()
    }
}

/// The mining economics model.
///
/// Generic over the random source so tests can inject scripted draws; runs
/// use the seeded ChaCha8 source.
pub struct Model<R: RandomSource = SeededSource> {
    config: ModelConfig,
    state: NetworkState,
    miners: Vec<Miner>,

    price_process: PriceProcess,
    discovery: BlockDiscoveryEngine,
    controller: DifficultyController,
    rewards: RewardDistributor,
    adaptation: AdaptationRule,
    bounds: HashrateBounds,

    rng: R,
    ledger: RunLedger,
}

impl Model<SeededSource> {
    /// Creates a model with a seeded source.
    ///
    /// If the config has no seed one is drawn from OS entropy; it is
    /// reported by [`Model::seed`] and logged so the run can be replayed.
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = SeededSource::from_optional(config.seed);
        Self::with_source(config, rng)
    }

    /// Restarts the run from step 0 with the same config and seed.
    ///
    /// A reset model replays the first run exactly.
    pub fn reset(&mut self) {
        let seed = self.rng.seed();
        let rng = SeededSource::from_optional(seed);
        self.restart(rng);
    }
}

impl<R: RandomSource> Model<R> {
    /// Creates a model drawing from the given source.
    pub fn with_source(config: ModelConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let miners = spawn_population(&config, &mut rng);
        let model = Self {
            state: NetworkState::initial(&config),
            miners,
            price_process: PriceProcess::from_config(&config),
            discovery: BlockDiscoveryEngine::new(),
            controller: DifficultyController::from_config(&config),
            rewards: RewardDistributor::new(config.block_subsidy),
            adaptation: config.adaptation,
            bounds: HashrateBounds::from_config(&config),
            ledger: RunLedger::new(config.initial_price),
            config,
            rng,
        };

        info!(
            "Model created: {} miners, network hashrate {:.3}, difficulty {:.3}, seed {:?}",
            model.miners.len(),
            model.network_hashrate(),
            model.state.difficulty,
            model.rng.seed()
        );

        Ok(model)
    }

    /// Restarts from step 0 with the same config and a new source.
    pub fn restart(&mut self, mut rng: R) {
        self.miners = spawn_population(&self.config, &mut rng);
        self.state = NetworkState::initial(&self.config);
        self.ledger = RunLedger::new(self.config.initial_price);
        self.rng = rng;
        debug!("Model restarted (seed {:?})", self.rng.seed());
    }

    /// Advances the model by one step.
    pub fn step(&mut self) -> StepOutcome {
        self.state.step_count += 1;
        let step = self.state.step_count;

        // 1. Price
        let previous_price = self.state.price;
        let price_move = self.price_process.advance(previous_price, &mut self.rng);
        let price_delta = price_move.delta_from(previous_price);
        self.state.price = price_move.price;
        self.ledger
            .record_price(price_move.price, price_move.shock.is_some(), price_move.floored);
        if price_move.floored {
            debug!("step {}: price clamped to floor {}", step, price_move.price);
        }

        // 2. Hashrate adaptation
        for miner in &mut self.miners {
            miner.adapt(price_delta, &self.adaptation, &self.bounds);
        }

        // 3. Block discovery
        let winner = self
            .discovery
            .sample(&self.miners, self.state.difficulty, &mut self.rng);
        if network_hashrate(&self.miners) <= 0.0 {
            self.ledger.record_idle();
            debug!("step {}: network hashrate is zero, no block possible", step);
        }

        // 4. Height + reward
        let mut reward = None;
        let mut retarget = None;
        if let Some(id) = winner {
            self.state.block_height += 1;
            self.state.block_discovery_steps.push(step);

            let miner = &mut self.miners[id.index()];
            let credited = self.rewards.credit(miner, self.state.price);
            self.ledger.record_block(step, credited);
            reward = Some(credited);

            debug!(
                "step {}: block {} found by {} (reward {:.4})",
                step, self.state.block_height, id, credited
            );

            // 5. Retarget
            if self.controller.is_retarget_height(self.state.block_height) {
                retarget = self.retarget();
            }
        }

        trace!(
            "step {} | price={:.4} | difficulty={:.4} | height={} | hashrate={:.4}",
            step,
            self.state.price,
            self.state.difficulty,
            self.state.block_height,
            network_hashrate(&self.miners)
        );

        StepOutcome {
            step,
            price: self.state.price,
            price_delta,
            shock: price_move.shock,
            winner,
            reward,
            retarget,
        }
    }

    fn retarget(&mut self) -> Option<Retarget> {
        let outcome = self.controller.retarget(
            self.state.difficulty,
            &self.state.block_discovery_steps,
            self.state.retarget_anchor,
        );

        if let Some(r) = outcome {
            self.state.difficulty = r.difficulty;
            self.ledger.record_retarget(r.clamped);
            info!(
                "Adjusting difficulty to: {:.4} (from {:.4}) | Average Block Time: {:.2} | Target: {:.2}{}",
                r.difficulty,
                r.previous,
                r.observed_block_time,
                self.controller.target_block_time(),
                if r.clamped { " | clamped" } else { "" }
            );
        }

        self.state.retarget_anchor = self.state.step_count;
        self.state.block_discovery_steps.clear();
        outcome
    }

    /// Runs `steps` steps.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Returns a consistent view of the current state.
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            step: self.state.step_count,
            price: self.state.price,
            difficulty: self.state.difficulty,
            block_height: self.state.block_height,
            network_hashrate: self.network_hashrate(),
            active_miners: self.active_miners(),
            miners: self.miners.iter().map(MinerSnapshot::from).collect(),
        }
    }

    pub fn price(&self) -> f64 {
        self.state.price
    }

    pub fn difficulty(&self) -> f64 {
        self.state.difficulty
    }

    pub fn block_height(&self) -> u64 {
        self.state.block_height
    }

    pub fn step_count(&self) -> u64 {
        self.state.step_count
    }

    pub fn state(&self) -> &NetworkState {
        &self.state
    }

    pub fn miners(&self) -> &[Miner] {
        &self.miners
    }

    pub fn network_hashrate(&self) -> f64 {
        network_hashrate(&self.miners)
    }

    pub fn active_miners(&self) -> usize {
        self.miners.iter().filter(|m| m.is_active()).count()
    }

    pub fn ledger(&self) -> &RunLedger {
        &self.ledger
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Seed of the random source, if it has one.
    pub fn seed(&self) -> Option<u64> {
        self.rng.seed()
    }

    /// Difference between reward issued and reward held by miners.
    ///
    /// Zero up to floating-point rounding; anything else means reward was
    /// created or lost.
    pub fn reward_imbalance(&self) -> f64 {
        let held: f64 = self.miners.iter().map(|m| m.cumulative_reward).sum();
        held - self.ledger.total_reward_issued
    }
}
