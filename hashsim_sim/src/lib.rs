//! hashsim Scenario Harness
//!
//! Drives the mining economics engine from `hashsim_core`:
//! - **Scenarios**: named parameter presets layered over a base config
//! - **Runner**: steps a model and checks its invariants after every step
//! - **Exporter**: writes the time series and population view as JSON
//!   for an external dashboard
//! - **SharedModel**: a mutex-guarded handle so an observer thread can take
//!   snapshots between steps
//!
//! # Usage
//!
//! ```
//! use hashsim_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42, 25).with_steps(500);
//! let result = runner.run(ScenarioId::Baseline).unwrap();
//! assert!(result.passed);
//! ```

mod error;
mod exporter;
mod runner;
mod shared;
pub mod scenarios;

pub use error::SimError;
pub use exporter::{FrameRecorder, MinerFrame, SimEvent, SimExport, SimFrame};
pub use runner::{check_step, RunSummary, ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use shared::SharedModel;
