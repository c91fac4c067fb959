//! Persistable dispute record
//!
//! [`ChallengeState`] is everything a dispute carries between two moves: the
//! commitment sequence and the dispute pointer. Transitions never mutate the
//! record in place. They validate a move against `&self` and return the next
//! record, so a rejected move cannot leave a half-applied state behind.

use serde::{Deserialize, Serialize};

use crate::bisection::expected_step;
use crate::error::{ChallengeError, Result};
use crate::types::{Commitment, Step};

/// Fewest commitments a sequence may hold
pub const MIN_COMMITMENTS: usize = 2;

/// Fewest sub-intervals a split must introduce
pub const MIN_SPLIT_INTERVALS: usize = 2;

/// Commitment sequence plus dispute pointer
///
/// Deserializing goes through [`ChallengeState::validate`], so a stored
/// record that breaks the invariants never loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChallengeState")]
pub struct ChallengeState {
    commitments: Vec<Commitment>,
    incorrect_step_index: usize,
}

/// Record as stored, before validation
#[derive(Deserialize)]
struct RawChallengeState {
    commitments: Vec<Commitment>,
    incorrect_step_index: usize,
}

impl TryFrom<RawChallengeState> for ChallengeState {
    type Error = ChallengeError;

    fn try_from(raw: RawChallengeState) -> Result<Self> {
        let state = Self {
            commitments: raw.commitments,
            incorrect_step_index: raw.incorrect_step_index,
        };
        state.validate()?;
        Ok(state)
    }
}

impl ChallengeState {
    /// Open a dispute over `commitments`, with no step asserted yet
    pub fn new(commitments: Vec<Commitment>) -> Result<Self> {
        let state = Self {
            commitments,
            incorrect_step_index: 0,
        };
        state.validate()?;
        Ok(state)
    }

    /// Check the record invariants
    ///
    /// Used on construction and whenever a record is reloaded from storage.
    pub fn validate(&self) -> Result<()> {
        if self.commitments.len() < MIN_COMMITMENTS {
            return Err(ChallengeError::InvalidCommitmentLength {
                len: self.commitments.len(),
            });
        }
        // a pointer left past the end by a shorter split is stale, not invalid
        check_increasing(&self.commitments)
    }

    /// Current commitment sequence
    pub fn commitments(&self) -> &[Commitment] {
        &self.commitments
    }

    /// Dispute pointer, 0 until a step has been asserted invalid
    pub const fn incorrect_step_index(&self) -> usize {
        self.incorrect_step_index
    }

    /// Last valid index of the sequence
    pub fn last_index(&self) -> usize {
        self.commitments.len().saturating_sub(1)
    }

    /// Pair `(commitments[i-1], commitments[i])` under dispute, if any
    pub fn disputed_pair(&self) -> Option<(Commitment, Commitment)> {
        let index = self.incorrect_step_index;
        if index == 0 {
            return None;
        }
        let before = self.commitments.get(index - 1)?;
        let after = self.commitments.get(index)?;
        Some((*before, *after))
    }

    /// Number of steps between the disputed pair
    pub fn width(&self) -> Option<Step> {
        self.disputed_pair().map(|(before, after)| after.step - before.step)
    }

    /// Mark the pair ending at `index` as disputed
    pub fn assert_invalid_step(&self, index: usize) -> Result<Self> {
        // checks
        if index == 0 {
            return Err(ChallengeError::CannotAssertFirstStepInvalid);
        }
        if index > self.last_index() {
            return Err(ChallengeError::InvalidChallengeIndex {
                index,
                last: self.last_index(),
            });
        }

        // effects
        Ok(Self {
            commitments: self.commitments.clone(),
            incorrect_step_index: index,
        })
    }

    /// Replace the disputed pair with a finer sequence
    ///
    /// The returned record holds `commitments` in full. The pointer is carried
    /// over unchanged and has to be re-asserted before the next move.
    pub fn split(&self, commitments: Vec<Commitment>) -> Result<Self> {
        // checks
        let num_splits = commitments.len().saturating_sub(1);
        if num_splits < MIN_SPLIT_INTERVALS {
            return Err(ChallengeError::InvalidCommitmentLength {
                len: commitments.len(),
            });
        }

        let (before, after) = self
            .disputed_pair()
            .ok_or(ChallengeError::FirstCommitmentInvalid)?;

        if commitments[0] != before {
            return Err(ChallengeError::FirstCommitmentInvalid);
        }
        if commitments[num_splits] != after {
            return Err(ChallengeError::LastCommitmentInvalid);
        }

        let n = num_splits as u64;
        for (i, commitment) in commitments.iter().enumerate().take(num_splits) {
            let expected = expected_step(before.step, after.step, i as u64, n);
            if commitment.step != expected {
                return Err(ChallengeError::InvalidIndices {
                    position: i,
                    expected,
                    actual: commitment.step,
                });
            }
        }

        // more intervals than steps makes floor division repeat a step
        check_increasing(&commitments)?;

        // effects
        Ok(Self {
            commitments,
            incorrect_step_index: self.incorrect_step_index,
        })
    }
}

fn check_increasing(commitments: &[Commitment]) -> Result<()> {
    for (i, pair) in commitments.windows(2).enumerate() {
        if pair[1].step <= pair[0].step {
            return Err(ChallengeError::InvalidIndices {
                position: i + 1,
                expected: pair[0].step.saturating_add(1),
                actual: pair[1].step,
            });
        }
    }
    Ok(())
}
