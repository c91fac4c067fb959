//! Common types

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte canonical digest of a computation state
pub type Digest = [u8; 32];

/// Index of a position in the trace
pub type Step = u64;

/// Checkpoint claiming the canonical state at a given trace position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment {
    /// Digest of the state at `step`
    pub root: Digest,
    /// Position in the trace
    pub step: Step,
}

impl Commitment {
    /// Create a new commitment
    pub const fn new(root: Digest, step: Step) -> Self {
        Self { root, step }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@0x{}", self.step, hex::encode(&self.root[..4]))
    }
}

/// Claim that `witness` is the true state at `commitments[starting_at]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof<S> {
    /// Index into the current commitment sequence
    pub starting_at: usize,
    /// State offered as evidence
    pub witness: S,
}

impl<S> Proof<S> {
    /// Create a new proof
    pub const fn new(starting_at: usize, witness: S) -> Self {
        Self {
            starting_at,
            witness,
        }
    }
}
