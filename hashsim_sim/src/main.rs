//! hashsim CLI
//!
//! Run mining economics scenarios with per-step invariant checks.

use clap::Parser;
use hashsim_core::ModelConfig;
use hashsim_sim::scenarios::ScenarioId;
use hashsim_sim::{FrameRecorder, RunSummary, ScenarioResult, ScenarioRunner, SimError, SimExport};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// hashsim mining economics simulator
#[derive(Parser, Debug)]
#[command(name = "hashsim")]
#[command(about = "Simulate miners, price and difficulty retargeting", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of miners (defaults to the config file's count, or 25)
    #[arg(short, long)]
    miners: Option<usize>,

    /// Steps per run
    #[arg(short = 'n', long, default_value = "1000")]
    steps: u64,

    /// Scenario to run (baseline, bull_run, crash, volatile, fast_retarget, idle_network, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to sweep
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Base model configuration as JSON
    #[arg(short, long)]
    config: Option<String>,

    /// Export the time series to a JSON file (single scenario only)
    #[arg(long)]
    export: Option<String>,

    /// Steps between exported frames
    #[arg(long, default_value = "10")]
    export_interval: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

/// Installs the log subscriber. With `--json` logs go to stderr so stdout
/// carries only the summary.
fn init_logging(verbose: bool, json: bool) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    };
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.expect("Failed to set tracing subscriber");
}

fn load_base(path: Option<&str>) -> Result<ModelConfig, SimError> {
    let Some(path) = path else {
        return Ok(ModelConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let config: ModelConfig = serde_json::from_str(&text)?;
    config.validate()?;
    info!("Loaded config from {}", path);
    Ok(config)
}

fn parse_scenarios(arg: &str) -> Result<Vec<ScenarioId>, SimError> {
    if arg == "all" {
        Ok(ScenarioId::all())
    } else {
        Ok(vec![arg.parse()?])
    }
}

/// Runs one scenario and writes its frames to `path`.
fn run_with_export(
    runner: &ScenarioRunner,
    scenario: ScenarioId,
    seed: u64,
    interval: u64,
    path: &str,
) -> Result<ScenarioResult, SimError> {
    let mut recorder = FrameRecorder::new(SimExport::new(scenario.name(), seed), interval, true);

    let (result, last) = runner.run_to_end(scenario, |model, outcome| {
        recorder.observe(|| model.snapshot(), outcome);
    })?;

    let mut export = recorder.finish(&last);
    export.finalize(result.passed, result.failure_reason.clone());
    export.write_to_file(path)?;
    info!("Exported {} frames to {}", export.frames.len(), path);

    Ok(result)
}

fn run(args: &Args) -> Result<bool, SimError> {
    let scenarios = parse_scenarios(&args.scenario)?;
    let base = load_base(args.config.as_deref())?;
    let miners = args.miners.unwrap_or(base.miner_count);

    let base_seed = if args.seed == 0 {
        rand::random::<u64>()
    } else {
        args.seed
    };

    if let Some(path) = &args.export {
        if scenarios.len() > 1 {
            return Err(SimError::ExportNeedsSingleScenario);
        }
        info!("Running with export to: {}", path);

        let runner = ScenarioRunner::new(base_seed, miners)
            .with_steps(args.steps)
            .with_base(base);
        let result = run_with_export(&runner, scenarios[0], base_seed, args.export_interval, path)?;
        report(&[result.clone()], args.json)?;
        return Ok(result.passed);
    }

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(offset as u64);
        let runner = ScenarioRunner::new(seed, miners)
            .with_steps(args.steps)
            .with_base(base.clone());

        for scenario in &scenarios {
            let result = runner.run(*scenario)?;
            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
            all_results.push(result);
        }
    }

    report(&all_results, args.json)?;
    Ok(all_results.iter().all(|r| r.passed))
}

fn report(results: &[ScenarioResult], json: bool) -> Result<(), SimError> {
    let total = results.len();
    let failed = results.iter().filter(|r| !r.passed).count();

    if json {
        println!("{}", RunSummary::new(results).to_json()?);
        return Ok(());
    }

    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for r in results {
        info!(
            "  {} seed={}: height={} price={:.4} difficulty={:.3} retargets={} shocks={}",
            r.scenario.name(),
            r.seed,
            r.final_block_height,
            r.final_price,
            r.final_difficulty,
            r.metrics.retargets,
            r.metrics.shocks
        );
    }

    if failed == 0 {
        info!("✅ All {} scenario runs passed!", total);
    } else {
        error!("❌ {}/{} scenario runs failed!", failed, total);
        for r in results.iter().filter(|r| !r.passed) {
            error!(
                "  - {} seed={}: {}",
                r.scenario.name(),
                r.seed,
                r.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.json);

    if !args.json {
        info!("hashsim v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Error: {}", e);
            if matches!(e, SimError::UnknownScenario(_)) {
                let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
                error!("Available scenarios: {}, all", names.join(", "));
            }
            std::process::exit(1);
        }
    }
}
