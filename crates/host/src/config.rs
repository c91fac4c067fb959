//! Configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use xlayer_dispute_core::Step;

/// Host configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Number of states in the demo trace (steps `0..trace_length`)
    pub trace_length: u64,
    /// First step at which the sequencer's trace diverges
    pub fault_at: Step,
    /// Steps of the sequencer's opening claim
    pub checkpoints: Vec<Step>,
    /// Gas budget for each fraud detection attempt
    pub gas_limit: u64,
    /// Rounds allowed before the game is abandoned
    pub max_rounds: u32,
    /// Sub-intervals per split
    pub fan_out: u64,
    /// Delay between two moves, in milliseconds
    pub round_interval_ms: u64,
    /// Where to persist the dispute record after each move
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace_length: 100,
            fault_at: 60,
            checkpoints: vec![0, 49, 89],
            gas_limit: 200,
            max_rounds: 10,
            fan_out: 2,
            round_interval_ms: 0,
            snapshot_path: None,
        }
    }
}

impl Config {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trace_length: env::var("TRACE_LENGTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.trace_length),
            fault_at: env::var("FAULT_AT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fault_at),
            checkpoints: env::var("CHECKPOINTS")
                .ok()
                .and_then(|s| parse_steps(&s))
                .unwrap_or(defaults.checkpoints),
            gas_limit: env::var("GAS_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.gas_limit),
            max_rounds: env::var("MAX_ROUNDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_rounds),
            fan_out: env::var("FAN_OUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fan_out),
            round_interval_ms: env::var("ROUND_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.round_interval_ms),
            snapshot_path: env::var("SNAPSHOT_PATH").ok().map(PathBuf::from),
        }
    }

    /// Reject settings no game can be played with
    pub fn validate(&self) -> Result<()> {
        if self.checkpoints.len() < 2 {
            bail!("need at least two checkpoints, got {}", self.checkpoints.len());
        }
        if self.checkpoints.windows(2).any(|w| w[0] >= w[1]) {
            bail!("checkpoints must be strictly increasing: {:?}", self.checkpoints);
        }
        if let Some(last) = self.checkpoints.last() {
            if *last >= self.trace_length {
                bail!("checkpoint {} is past the end of a {}-state trace", last, self.trace_length);
            }
        }
        if self.fan_out < 2 {
            bail!("fan-out must be at least 2, got {}", self.fan_out);
        }
        if self.max_rounds == 0 {
            bail!("max rounds must be positive");
        }
        Ok(())
    }

    /// Last step of the demo trace
    pub const fn last_step(&self) -> Step {
        self.trace_length.saturating_sub(1)
    }

    /// Delay between two moves
    pub const fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }
}

/// Parse a comma separated list of steps such as `0,49,89`
pub fn parse_steps(s: &str) -> Option<Vec<Step>> {
    s.split(',').map(|part| part.trim().parse().ok()).collect()
}
