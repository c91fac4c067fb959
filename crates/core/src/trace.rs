//! Trace log for bisection
//!
//! A [`TraceLog`] is the list of commitments one party believes in, one per
//! step. Each party compares the sequence under dispute against its own log
//! to decide where to push next.

use serde::{Deserialize, Serialize};

use crate::machine::StateMachine;
use crate::types::{Commitment, Digest, Step};

/// Advance `state` by `steps` without any gas accounting
pub fn replay<M: StateMachine>(machine: &M, state: &M::State, steps: Step) -> M::State {
    let mut state = state.clone();
    for _ in 0..steps {
        state = machine.step(&state);
    }
    state
}

/// Commitments indexed by step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLog {
    /// Recorded commitments, in step order
    pub entries: Vec<Commitment>,
}

impl TraceLog {
    /// Create an empty log
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Run `machine` from `genesis` and commit to every state up to `last_step`
    pub fn record<M: StateMachine>(machine: &M, genesis: &M::State, last_step: Step) -> Self {
        let mut log = Self::new();
        let mut state = genesis.clone();
        for step in 0..=last_step {
            if step > 0 {
                state = machine.step(&state);
            }
            log.add_entry(Commitment::new(machine.canonicalize(&state), step));
        }
        log
    }

    /// Log with `roots[i]` committed at step `i`
    pub fn from_roots<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = Digest>,
    {
        let entries = roots
            .into_iter()
            .zip(0..)
            .map(|(root, step)| Commitment::new(root, step))
            .collect();
        Self { entries }
    }

    /// Append a commitment to the log
    pub fn add_entry(&mut self, entry: Commitment) {
        self.entries.push(entry);
    }

    /// Last step covered by the log
    pub fn last_step(&self) -> Option<Step> {
        self.entries.last().map(|e| e.step)
    }

    /// Get commitment at specific step
    pub fn commitment_at(&self, step: Step) -> Option<Commitment> {
        // entries are normally dense, so try the direct slot first
        if let Some(entry) = usize::try_from(step).ok().and_then(|i| self.entries.get(i)) {
            if entry.step == step {
                return Some(*entry);
            }
        }
        self.entries.iter().find(|e| e.step == step).copied()
    }

    /// Commitments at each of `steps`, or `None` if any step is missing
    pub fn commitments_at(&self, steps: &[Step]) -> Option<Vec<Commitment>> {
        steps.iter().map(|&step| self.commitment_at(step)).collect()
    }

    /// Index of the first commitment in `commitments` this log disagrees with
    pub fn first_mismatch(&self, commitments: &[Commitment]) -> Option<usize> {
        commitments.iter().position(|c| self.commitment_at(c.step) != Some(*c))
    }
}
