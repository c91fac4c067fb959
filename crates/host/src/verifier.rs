//! Verifier side of a dispute
//!
//! The verifier holds the honest trace. Every round it finds the first
//! commitment it disagrees with and offers the state just before it as a
//! witness.

use anyhow::{bail, Result};
use tracing::debug;

use xlayer_dispute_core::{replay, Commitment, Proof, StateMachine, Step, TraceLog};

/// Party challenging the claimed trace
#[derive(Debug)]
pub struct Verifier<M: StateMachine> {
    machine: M,
    genesis: M::State,
    /// Honest commitments, one per step
    trace_log: TraceLog,
}

impl<M: StateMachine> Verifier<M> {
    /// Create a verifier that executes the trace up to `last_step` itself
    pub fn new(machine: M, genesis: M::State, last_step: Step) -> Self {
        let trace_log = TraceLog::record(&machine, &genesis, last_step);
        Self {
            machine,
            genesis,
            trace_log,
        }
    }

    /// Honest commitments
    pub const fn trace_log(&self) -> &TraceLog {
        &self.trace_log
    }

    /// Index of the first commitment that disagrees with the honest trace
    pub fn first_incorrect(&self, commitments: &[Commitment]) -> Option<usize> {
        self.trace_log.first_mismatch(commitments)
    }

    /// Witness for the last correct commitment before the first incorrect one
    ///
    /// Returns `None` when every commitment is correct.
    pub fn proof_for(&self, commitments: &[Commitment]) -> Result<Option<Proof<M::State>>> {
        let Some(index) = self.first_incorrect(commitments) else {
            return Ok(None);
        };
        if index == 0 {
            bail!("first commitment {} disagrees with the honest trace", commitments[0]);
        }

        let last_correct = commitments[index - 1];
        debug!("First incorrect commitment {}, replaying to {}", commitments[index], last_correct);
        let witness = replay(&self.machine, &self.genesis, last_correct.step);
        Ok(Some(Proof::new(index - 1, witness)))
    }
}
