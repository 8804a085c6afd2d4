//! Scenario runner - executes presets and checks model invariants every step.

use crate::error::SimError;
use crate::scenarios::ScenarioId;

use hashsim_core::{Model, ModelConfig, ModelSnapshot, RunLedger, StepOutcome};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario that was run
    #[serde(serialize_with = "serialize_scenario")]
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether every invariant held for every step
    pub passed: bool,

    /// Steps executed (fewer than requested if an invariant broke)
    pub total_steps: u64,

    /// Block height at the end of the run
    pub final_block_height: u64,

    /// Price at the end of the run
    pub final_price: f64,

    /// Difficulty at the end of the run
    pub final_difficulty: f64,

    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Metrics collected during the run
    pub metrics: ScenarioMetrics,
}

fn serialize_scenario<S: serde::Serializer>(id: &ScenarioId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(id.name())
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioMetrics {
    /// Blocks found
    pub blocks_found: u64,

    /// Difficulty retargets performed
    pub retargets: u64,

    /// Retargets that hit a difficulty bound
    pub clamped_retargets: u64,

    /// Price shocks applied
    pub shocks: u64,

    /// Steps with zero network hashrate
    pub idle_steps: u64,

    /// Average steps per block
    pub mean_block_time: Option<f64>,

    /// Fraction of steps that produced a block
    pub block_rate: f64,

    /// Total reward issued to miners
    pub total_reward_issued: f64,

    /// Lowest price seen
    pub min_price: f64,

    /// Highest price seen
    pub max_price: f64,

    /// Miners with non-zero hashrate at the end
    pub active_miners: usize,
}

impl ScenarioMetrics {
    fn from_ledger(ledger: &RunLedger, active_miners: usize) -> Self {
        Self {
            blocks_found: ledger.blocks_found,
            retargets: ledger.retargets,
            clamped_retargets: ledger.clamped_retargets,
            shocks: ledger.shocks,
            idle_steps: ledger.idle_steps,
            mean_block_time: ledger.mean_block_time(),
            block_rate: ledger.block_rate(),
            total_reward_issued: ledger.total_reward_issued,
            min_price: ledger.min_price,
            max_price: ledger.max_price,
            active_miners,
        }
    }
}

/// Machine-readable summary of a batch of runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: &'a [ScenarioResult],
}

impl<'a> RunSummary<'a> {
    pub fn new(results: &'a [ScenarioResult]) -> Self {
        let failed = results.iter().filter(|r| !r.passed).count();
        Self {
            total: results.len(),
            passed: results.len() - failed,
            failed,
            results,
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Checks the step-to-step invariants of a model.
///
/// Returns a description of the first violated invariant, if any.
pub fn check_step(model: &Model, height_before: u64, outcome: &StepOutcome) -> Option<String> {
    let step = outcome.step;

    if !(model.price() > 0.0) {
        return Some(format!("step {step}: price {} is not positive", model.price()));
    }
    if !(model.difficulty() > 0.0) {
        return Some(format!("step {step}: difficulty {} is not positive", model.difficulty()));
    }

    let height = model.block_height();
    let advanced = height.checked_sub(height_before);
    let expected = if outcome.found_block() { Some(1) } else { Some(0) };
    if advanced != expected {
        return Some(format!(
            "step {step}: height went {height_before} -> {height} but block found = {}",
            outcome.found_block()
        ));
    }

    let interval = model.config().retarget_interval;
    let due = outcome.found_block() && height % interval == 0;
    if outcome.retarget.is_some() != due {
        return Some(format!(
            "step {step}: retarget fired = {} at height {height} (interval {interval})",
            outcome.retarget.is_some()
        ));
    }

    let imbalance = model.reward_imbalance();
    let tolerance = 1e-9 * model.ledger().total_reward_issued.max(1.0);
    if imbalance.abs() > tolerance {
        return Some(format!("step {step}: reward imbalance {imbalance:e}"));
    }

    None
}

/// Runs scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Number of miners
    num_miners: usize,

    /// Steps per run
    steps: u64,

    /// Parameters the scenario presets are layered over
    base: ModelConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, num_miners: usize) -> Self {
        Self {
            seed,
            num_miners,
            steps: 1_000,
            base: ModelConfig::default(),
        }
    }

    /// Sets the number of steps per run.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the base configuration (seed and miner count are overridden).
    pub fn with_base(mut self, base: ModelConfig) -> Self {
        self.base = base;
        self
    }

    /// Returns the config a scenario will run with.
    pub fn config_for(&self, scenario: ScenarioId) -> ModelConfig {
        scenario.apply(
            self.base
                .clone()
                .with_miners(self.num_miners)
                .with_seed(self.seed),
        )
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        self.run_observed(scenario, |_, _| {})
    }

    /// Runs a scenario, handing the model and outcome to `observe` after every step.
    pub fn run_observed<F>(&self, scenario: ScenarioId, observe: F) -> Result<ScenarioResult, SimError>
    where
        F: FnMut(&Model, &StepOutcome),
    {
        self.execute(scenario, observe).map(|(result, _)| result)
    }

    /// Like [`ScenarioRunner::run_observed`], also returning the state the run ended in.
    pub fn run_to_end<F>(
        &self,
        scenario: ScenarioId,
        observe: F,
    ) -> Result<(ScenarioResult, ModelSnapshot), SimError>
    where
        F: FnMut(&Model, &StepOutcome),
    {
        self.execute(scenario, observe)
            .map(|(result, model)| (result, model.snapshot()))
    }

    fn execute<F>(&self, scenario: ScenarioId, mut observe: F) -> Result<(ScenarioResult, Model), SimError>
    where
        F: FnMut(&Model, &StepOutcome),
    {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        let mut model = Model::new(self.config_for(scenario))?;
        let mut failure_reason = None;

        for _ in 0..self.steps {
            let height_before = model.block_height();
            let outcome = model.step();
            observe(&model, &outcome);

            if let Some(reason) = check_step(&model, height_before, &outcome) {
                warn!("✗ invariant violated: {}", reason);
                failure_reason = Some(reason);
                break;
            }

            if outcome.step % 250 == 0 {
                debug!(
                    "  step={} | price={:.4} | difficulty={:.3} | height={} | hashrate={:.3}",
                    outcome.step,
                    model.price(),
                    model.difficulty(),
                    model.block_height(),
                    model.network_hashrate()
                );
            }
        }

        if failure_reason.is_none() && scenario.expects_no_blocks() && model.block_height() > 0 {
            failure_reason = Some(format!(
                "expected no blocks, found {}",
                model.block_height()
            ));
        }

        let metrics = ScenarioMetrics::from_ledger(model.ledger(), model.active_miners());
        info!(
            "✓ {} complete: {} blocks in {} steps, {} retargets, final price {:.4}",
            scenario.name(),
            metrics.blocks_found,
            model.step_count(),
            metrics.retargets,
            model.price()
        );

        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_steps: model.step_count(),
            final_block_height: model.block_height(),
            final_price: model.price(),
            final_difficulty: model.difficulty(),
            failure_reason,
            metrics,
        };
        Ok((result, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_scenarios_pass() {
        for seed in [1u64, 42, 1337] {
            let runner = ScenarioRunner::new(seed, 25).with_steps(2_000);
            for scenario in ScenarioId::all() {
                let result = runner.run(scenario).unwrap();
                assert!(
                    result.passed,
                    "{} seed={} failed: {:?}",
                    scenario,
                    seed,
                    result.failure_reason
                );
                assert_eq!(result.total_steps, 2_000);
            }
        }
    }

    #[test]
    fn test_idle_network_finds_nothing() {
        let runner = ScenarioRunner::new(7, 10).with_steps(500);
        let result = runner.run(ScenarioId::IdleNetwork).unwrap();

        assert!(result.passed);
        assert_eq!(result.final_block_height, 0);
        assert_eq!(result.metrics.idle_steps, 500);
        assert_eq!(result.metrics.active_miners, 0);
        assert_eq!(result.metrics.block_rate, 0.0);
    }

    #[test]
    fn test_fast_retarget_retargets_more() {
        let runner = ScenarioRunner::new(5, 25).with_steps(3_000);
        let base = runner.run(ScenarioId::Baseline).unwrap();
        let fast = runner.run(ScenarioId::FastRetarget).unwrap();

        assert!(fast.metrics.retargets > base.metrics.retargets);
        assert_eq!(fast.metrics.retargets, fast.final_block_height / 5);
        assert_eq!(
            fast.metrics.block_rate,
            fast.final_block_height as f64 / 3_000.0
        );
    }

    #[test]
    fn test_runs_are_reproducible() {
        let runner = ScenarioRunner::new(99, 12).with_steps(800);
        let a = runner.run(ScenarioId::Volatile).unwrap();
        let b = runner.run(ScenarioId::Volatile).unwrap();

        assert_eq!(a.final_price.to_bits(), b.final_price.to_bits());
        assert_eq!(a.final_difficulty.to_bits(), b.final_difficulty.to_bits());
        assert_eq!(a.final_block_height, b.final_block_height);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let runner = ScenarioRunner::new(3, 5).with_steps(120);
        let mut seen = Vec::new();
        runner
            .run_observed(ScenarioId::Baseline, |model, outcome| {
                assert_eq!(model.step_count(), outcome.step);
                seen.push(outcome.step);
            })
            .unwrap();
        assert_eq!(seen, (1..=120).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_base_config_is_an_error() {
        let mut base = ModelConfig::default();
        base.block_subsidy = -1.0;
        let runner = ScenarioRunner::new(1, 5).with_base(base);
        assert!(matches!(runner.run(ScenarioId::Baseline), Err(SimError::Config(_))));
    }

    #[test]
    fn test_zero_miners_rejected() {
        let runner = ScenarioRunner::new(1, 0);
        assert!(matches!(runner.run(ScenarioId::Baseline), Err(SimError::Config(_))));
    }

    #[test]
    fn test_run_to_end_returns_final_state() {
        let runner = ScenarioRunner::new(8, 6).with_steps(300);
        let (result, view) = runner.run_to_end(ScenarioId::Baseline, |_, _| {}).unwrap();

        assert_eq!(view.step, 300);
        assert_eq!(view.miners.len(), 6);
        assert_eq!(view.block_height, result.final_block_height);
        assert_eq!(view.price.to_bits(), result.final_price.to_bits());
    }

    #[test]
    fn test_run_to_end_without_steps_is_initial_state() {
        let runner = ScenarioRunner::new(8, 6).with_steps(0);
        let (_, view) = runner.run_to_end(ScenarioId::IdleNetwork, |_, _| {}).unwrap();
        assert_eq!(view.step, 0);
        assert_eq!(view.active_miners, 0);
    }

    #[test]
    fn test_summary_is_parseable_json() {
        let runner = ScenarioRunner::new(2, 4).with_steps(50);
        let results = vec![
            runner.run(ScenarioId::Crash).unwrap(),
            runner.run(ScenarioId::IdleNetwork).unwrap(),
        ];

        let text = RunSummary::new(&results).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["passed"], 2);
        assert_eq!(value["failed"], 0);
        assert_eq!(value["results"][0]["scenario"], "crash");
        assert_eq!(value["results"][1]["metrics"]["block_rate"], 0.0);
    }

    #[test]
    fn test_result_serializes_scenario_name() {
        let result = ScenarioRunner::new(1, 3).with_steps(10).run(ScenarioId::Crash).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["scenario"], "crash");
        assert!(json.get("failure_reason").is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_every_scenario_holds_invariants(
            seed in any::<u64>(),
            miners in 1usize..30,
            which in 0usize..6,
        ) {
            let scenario = ScenarioId::all()[which];
            let result = ScenarioRunner::new(seed, miners).with_steps(300).run(scenario).unwrap();
            prop_assert!(result.passed, "{:?}", result.failure_reason);
            prop_assert_eq!(result.metrics.blocks_found, result.final_block_height);
        }
    }
}
