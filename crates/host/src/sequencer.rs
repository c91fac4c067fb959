//! Sequencer side of a dispute
//!
//! The sequencer defends the trace it published. It opens the dispute with
//! its checkpoints and answers every assertion with a split of the disputed
//! pair taken from its own log.

use anyhow::{anyhow, bail, Result};
use tracing::debug;

use xlayer_dispute_core::{bisection_points, ChallengeState, Commitment, Step, TraceLog};

/// Party defending the claimed trace
#[derive(Clone, Debug)]
pub struct Sequencer {
    /// Trace the sequencer committed to
    trace_log: TraceLog,
}

impl Sequencer {
    /// Create a new sequencer
    pub const fn new(trace_log: TraceLog) -> Self {
        Self { trace_log }
    }

    /// Trace the sequencer committed to
    pub const fn trace_log(&self) -> &TraceLog {
        &self.trace_log
    }

    /// Opening claim: our commitments at each of `steps`
    pub fn initial_commitments(&self, steps: &[Step]) -> Result<Vec<Commitment>> {
        self.trace_log
            .commitments_at(steps)
            .ok_or_else(|| anyhow!("trace log does not cover checkpoints {steps:?}"))
    }

    /// Split the disputed pair into `fan_out` sub-intervals
    ///
    /// The fan-out is clamped to the width of the pair so that every interior
    /// point lands on a distinct step.
    pub fn propose_split(&self, state: &ChallengeState, fan_out: u64) -> Result<Vec<Commitment>> {
        let (before, after) = state
            .disputed_pair()
            .ok_or_else(|| anyhow!("no step has been asserted invalid"))?;

        let width = after.step - before.step;
        if width < 2 {
            bail!("pair {before} .. {after} is a single step and cannot be split");
        }

        let n = fan_out.clamp(2, width);
        let steps = bisection_points(before.step, after.step, n)
            .ok_or_else(|| anyhow!("no {n}-way split of {before} .. {after}"))?;

        let mut commitments = self
            .trace_log
            .commitments_at(&steps)
            .ok_or_else(|| anyhow!("trace log does not cover steps {steps:?}"))?;

        // endpoints must be exactly what is on record
        if let Some(first) = commitments.first_mut() {
            *first = before;
        }
        if let Some(last) = commitments.last_mut() {
            *last = after;
        }

        debug!(
            "Proposing {}-way split of {} .. {} at steps {:?}",
            n, before, after, steps
        );
        Ok(commitments)
    }
}
