//! JSON exporter for external dashboards.
//!
//! Exports the model's time series (price, difficulty, height, network
//! hashrate, active miners) and the miner population view as JSON frames.

use hashsim_core::{ModelSnapshot, StepOutcome};
use hashsim_env::MinerId;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Steps executed when the frame was taken
    pub step: u64,

    pub price: f64,
    pub difficulty: f64,
    pub block_height: u64,
    pub network_hashrate: f64,
    pub active_miners: usize,

    /// Reward held by all miners
    pub total_reward: f64,

    /// Population view
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub miners: Vec<MinerFrame>,

    /// Events since the previous frame (retargets, shocks)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SimEvent>,
}

impl SimFrame {
    /// Builds a frame from a snapshot.
    pub fn from_snapshot(snapshot: &ModelSnapshot, include_miners: bool) -> Self {
        let miners = if include_miners {
            snapshot
                .miners
                .iter()
                .map(|m| MinerFrame {
                    id: m.id,
                    hashrate: m.hashrate,
                    cumulative_reward: m.cumulative_reward,
                    blocks_won: m.blocks_won,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            step: snapshot.step,
            price: snapshot.price,
            difficulty: snapshot.difficulty,
            block_height: snapshot.block_height,
            network_hashrate: snapshot.network_hashrate,
            active_miners: snapshot.active_miners,
            total_reward: snapshot.total_reward(),
            miners,
            events: Vec::new(),
        }
    }
}

/// Miner frame data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerFrame {
    pub id: MinerId,
    pub hashrate: f64,
    pub cumulative_reward: f64,
    pub blocks_won: u64,
}

/// Simulation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimEvent {
    pub step: u64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Steps covered
    pub steps: u64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            steps: 0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.steps = frame.step;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Samples frames from a running model every `interval` steps.
///
/// Events are buffered between frames so none are lost. Call
/// [`FrameRecorder::finish`] with the final snapshot so the last step is
/// always exported.
pub struct FrameRecorder {
    export: SimExport,
    interval: u64,
    include_miners: bool,
    pending: Vec<SimEvent>,
}

impl FrameRecorder {
    pub fn new(export: SimExport, interval: u64, include_miners: bool) -> Self {
        Self {
            export,
            interval: interval.max(1),
            include_miners,
            pending: Vec::new(),
        }
    }

    /// Records one step.
    pub fn observe(&mut self, snapshot: impl FnOnce() -> ModelSnapshot, outcome: &StepOutcome) {
        if let Some(r) = &outcome.retarget {
            self.pending.push(SimEvent {
                step: outcome.step,
                message: format!(
                    "retarget {:.4} -> {:.4} (observed block time {:.2})",
                    r.previous, r.difficulty, r.observed_block_time
                ),
                level: r.clamped.then(|| "warn".to_string()),
            });
        }
        if let Some(shock) = outcome.shock {
            self.pending.push(SimEvent {
                step: outcome.step,
                message: format!(
                    "price shock: {:+.2}% (price moved {:+.2}%)",
                    shock * 100.0,
                    outcome.price_delta * 100.0
                ),
                level: None,
            });
        }

        if outcome.step % self.interval == 0 {
            self.push(&snapshot());
        }
    }

    fn push(&mut self, snapshot: &ModelSnapshot) {
        let mut frame = SimFrame::from_snapshot(snapshot, self.include_miners);
        frame.events = std::mem::take(&mut self.pending);
        self.export.add_frame(frame);
    }

    /// Adds the final frame if it was not already taken and returns the export.
    pub fn finish(mut self, last: &ModelSnapshot) -> SimExport {
        let already = self.export.frames.last().map(|f| f.step) == Some(last.step);
        if !already {
            self.push(last);
        }
        self.export
    }
}
