//! Challenge manager
//!
//! Owns one dispute: its [`ChallengeState`] and the [`StateMachine`] that
//! defines a correct step. Moves are applied by swapping in the record
//! returned by the pure transition, so a rejected move has no effect.

use crate::error::{ChallengeError, Result};
use crate::machine::StateMachine;
use crate::state::ChallengeState;
use crate::types::{Commitment, Proof};

/// Gas budget used by [`ChallengeManager::detect_fraud`]
pub const DEFAULT_GAS_LIMIT: u64 = 1;

/// Orchestrates the assert / split / detect-fraud moves of one dispute
#[derive(Debug)]
pub struct ChallengeManager<M> {
    state: ChallengeState,
    machine: M,
}

impl<M: StateMachine> ChallengeManager<M> {
    /// Open a dispute over `commitments`
    pub fn new(commitments: Vec<Commitment>, machine: M) -> Result<Self> {
        Ok(Self {
            state: ChallengeState::new(commitments)?,
            machine,
        })
    }

    /// Resume a dispute from a stored record
    pub fn from_state(state: ChallengeState, machine: M) -> Result<Self> {
        state.validate()?;
        Ok(Self { state, machine })
    }

    /// Current record
    pub const fn state(&self) -> &ChallengeState {
        &self.state
    }

    /// Give back the record for storage
    pub fn into_state(self) -> ChallengeState {
        self.state
    }

    /// Current commitment sequence
    pub fn commitments(&self) -> &[Commitment] {
        self.state.commitments()
    }

    /// Dispute pointer
    pub const fn incorrect_step_index(&self) -> usize {
        self.state.incorrect_step_index()
    }

    /// Machine replaying disputed steps
    pub const fn machine(&self) -> &M {
        &self.machine
    }

    /// Mark the pair ending at `index` as disputed
    pub fn assert_invalid_step(&mut self, index: usize) -> Result<()> {
        self.state = self.state.assert_invalid_step(index)?;
        Ok(())
    }

    /// Replace the disputed pair with a finer sequence
    pub fn split(&mut self, commitments: Vec<Commitment>) -> Result<()> {
        self.state = self.state.split(commitments)?;
        Ok(())
    }

    /// [`Self::detect_fraud_with_limit`] with [`DEFAULT_GAS_LIMIT`]
    pub fn detect_fraud(&self, proof: Proof<M::State>) -> Result<bool> {
        self.detect_fraud_with_limit(proof, DEFAULT_GAS_LIMIT)
    }

    /// Replay from `proof.witness` to the next commitment and compare.
    ///
    /// Returns `Ok(false)` without spending gas when the witness does not
    /// canonicalize to the starting commitment. Otherwise returns `Ok(true)`
    /// when the replayed state disagrees with the following commitment.
    ///
    /// A range wider than one step fails with [`ChallengeError::OutOfGas`]
    /// once its cost exceeds `gas_limit`. A single step is always affordable
    /// and never runs out of gas, whatever the limit.
    pub fn detect_fraud_with_limit(&self, proof: Proof<M::State>, gas_limit: u64) -> Result<bool> {
        let commitments = self.state.commitments();
        let (before, after) = match (
            commitments.get(proof.starting_at),
            proof.starting_at.checked_add(1).and_then(|i| commitments.get(i)),
        ) {
            (Some(before), Some(after)) => (*before, *after),
            _ => {
                return Err(ChallengeError::InvalidChallengeIndex {
                    index: proof.starting_at,
                    last: self.state.last_index(),
                })
            }
        };

        if self.machine.canonicalize(&proof.witness) != before.root {
            return Ok(false);
        }

        let width = after.step - before.step;
        let metered = width > 1;
        let mut gas_used = 0u64;
        let mut witness = proof.witness;
        for _ in 0..width {
            gas_used = gas_used.saturating_add(self.machine.step_cost(&witness));
            if metered && gas_used > gas_limit {
                return Err(ChallengeError::OutOfGas {
                    used: gas_used,
                    limit: gas_limit,
                });
            }
            witness = self.machine.step(&witness);
        }

        Ok(after.root != self.machine.canonicalize(&witness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Keccak256Hasher;
    use crate::machine::FnMachine;
    use crate::types::{Digest, Step};

    /// Counter charging its own value per step
    fn counter() -> impl StateMachine<State = u64> + std::fmt::Debug {
        FnMachine::new(|s: &u64| s + 1, |s: &u64| Keccak256Hasher::hash_u64(*s))
            .with_cost(|s: &u64| *s)
    }

    fn honest(value: u64) -> Digest {
        Keccak256Hasher::hash_u64(value)
    }

    fn corrupted(value: u64) -> Digest {
        Keccak256Hasher::hash_pair(&honest(value), &[0x01; 32])
    }

    /// Trace of `len` states that is honest before `fault_at` and corrupted after
    fn diverging(len: u64, fault_at: u64) -> Vec<Digest> {
        (0..len)
            .map(|v| {
                if v < fault_at {
                    honest(v)
                } else {
                    corrupted(v)
                }
            })
            .collect()
    }

    fn commitment(roots: &[Digest], steps: &[Step]) -> Vec<Commitment> {
        steps.iter().map(|&s| Commitment::new(roots[s as usize], s)).collect()
    }

    #[test]
    fn test_new_requires_two_commitments() {
        let roots = diverging(10, 5);
        assert_eq!(
            ChallengeManager::new(commitment(&roots, &[0]), counter()).unwrap_err(),
            ChallengeError::InvalidCommitmentLength { len: 1 }
        );
        let cm = ChallengeManager::new(commitment(&roots, &[0, 9]), counter()).unwrap();
        assert_eq!(cm.incorrect_step_index(), 0);
    }

    #[test]
    fn test_manual_bisection() {
        let roots = diverging(10, 5);
        let mut cm = ChallengeManager::new(commitment(&roots, &[0, 9]), counter()).unwrap();

        cm.assert_invalid_step(1).unwrap();
        assert_eq!(cm.incorrect_step_index(), 1);

        cm.split(commitment(&roots, &[0, 4, 9])).unwrap();
        cm.assert_invalid_step(2).unwrap();

        assert!(matches!(
            cm.split(commitment(&roots, &[4, 7, 9])),
            Err(ChallengeError::InvalidIndices { .. })
        ));
        assert_eq!(
            cm.split(commitment(&roots, &[4, 9])),
            Err(ChallengeError::InvalidCommitmentLength { len: 2 })
        );
        assert_eq!(
            cm.split(commitment(&roots, &[0, 2, 4])),
            Err(ChallengeError::FirstCommitmentInvalid)
        );
        assert_eq!(
            cm.split(commitment(&roots, &[4, 6, 8])),
            Err(ChallengeError::LastCommitmentInvalid)
        );
        assert_eq!(cm.commitments(), commitment(&roots, &[0, 4, 9]).as_slice());

        cm.split(commitment(&roots, &[4, 6, 9])).unwrap();

        let err = cm.detect_fraud_with_limit(Proof::new(0, 4), 5).unwrap_err();
        assert!(err.is_out_of_gas());

        cm.assert_invalid_step(1).unwrap();
        cm.split(commitment(&roots, &[4, 5, 6])).unwrap();

        assert_eq!(cm.detect_fraud(Proof::new(0, 4)), Ok(true));
    }

    fn first_incorrect<M: StateMachine>(
        cm: &ChallengeManager<M>,
        validated: &[Commitment],
    ) -> usize {
        cm.commitments()
            .iter()
            .position(|c| validated[c.step as usize] != *c)
            .unwrap()
    }

    #[test]
    fn test_automatic_bisection() {
        let incorrect = diverging(100, 60);
        let validated: Vec<Commitment> =
            (0..100).map(|step| Commitment::new(honest(step), step)).collect();
        let mut cm =
            ChallengeManager::new(commitment(&incorrect, &[0, 49, 89]), counter()).unwrap();

        let mut resolved = false;
        for _round in 0..10 {
            // the verifier posts the last correct commitment
            let idx = first_incorrect(&cm, &validated);
            let last_correct = cm.commitments()[idx - 1];
            match cm.detect_fraud_with_limit(Proof::new(idx - 1, last_correct.step), 200) {
                Ok(fraud) => {
                    assert!(fraud);
                    resolved = true;
                    break;
                }
                Err(e) if e.is_out_of_gas() => cm.assert_invalid_step(idx).unwrap(),
                Err(e) => panic!("unexpected error: {e}"),
            }

            // the sequencer bisects
            let (first, last) = cm.state().disputed_pair().unwrap();
            let step = (first.step + last.step) / 2;
            let middle = Commitment::new(incorrect[step as usize], step);
            cm.split(vec![first, middle, last]).unwrap();
        }

        assert!(resolved);
        assert_eq!(
            cm.commitments(),
            commitment(&incorrect, &[59, 61, 64]).as_slice()
        );
        assert_eq!(cm.detect_fraud_with_limit(Proof::new(0, 59), 200), Ok(true));
    }

    #[test]
    fn test_default_budget_covers_single_step_only() {
        let roots = diverging(10, 5);
        let mut cm = ChallengeManager::new(commitment(&roots, &[0, 4, 9]), counter()).unwrap();
        cm.assert_invalid_step(2).unwrap();
        cm.split(commitment(&roots, &[4, 6, 9])).unwrap();

        assert_eq!(
            cm.detect_fraud(Proof::new(0, 4)),
            Err(ChallengeError::OutOfGas {
                used: 4,
                limit: DEFAULT_GAS_LIMIT
            })
        );

        // two unit-cost steps still exceed the default budget
        let unit = FnMachine::new(|s: &u64| s + 1, |s: &u64| Keccak256Hasher::hash_u64(*s));
        let cm = ChallengeManager::new(commitment(&roots, &[4, 6]), unit).unwrap();
        assert_eq!(
            cm.detect_fraud(Proof::new(0, 4)),
            Err(ChallengeError::OutOfGas {
                used: 2,
                limit: DEFAULT_GAS_LIMIT
            })
        );
    }

    #[test]
    fn test_rejected_moves_leave_dispute_untouched() {
        let roots = diverging(10, 5);
        let mut cm = ChallengeManager::new(commitment(&roots, &[0, 4, 9]), counter()).unwrap();
        cm.assert_invalid_step(2).unwrap();

        assert!(cm.split(commitment(&roots, &[4, 7, 9])).is_err());
        assert!(cm.split(commitment(&roots, &[0, 2, 4])).is_err());
        assert!(cm.assert_invalid_step(0).is_err());
        assert!(cm.assert_invalid_step(3).is_err());

        assert_eq!(cm.commitments(), commitment(&roots, &[0, 4, 9]).as_slice());
        assert_eq!(cm.incorrect_step_index(), 2);
    }

    #[test]
    fn test_single_step_never_runs_out_of_gas() {
        let roots = diverging(10, 5);
        let mut cm = ChallengeManager::new(commitment(&roots, &[4, 5]), counter()).unwrap();
        for limit in [0, 1, 3] {
            assert_eq!(cm.detect_fraud_with_limit(Proof::new(0, 4), limit), Ok(true));
        }

        cm = ChallengeManager::new(commitment(&roots, &[2, 3]), counter()).unwrap();
        assert_eq!(cm.detect_fraud_with_limit(Proof::new(0, 2), 0), Ok(false));
    }

    #[test]
    fn test_mismatched_witness_is_not_fraud() {
        let roots = diverging(10, 5);
        let cm = ChallengeManager::new(commitment(&roots, &[0, 9]), counter()).unwrap();
        // a wide range would run out of gas if the witness were accepted
        for limit in [0, 1, u64::MAX] {
            assert_eq!(cm.detect_fraud_with_limit(Proof::new(0, 1), limit), Ok(false));
        }
    }

    #[test]
    fn test_honest_range_within_budget() {
        let roots = diverging(10, 10);
        let cm = ChallengeManager::new(commitment(&roots, &[2, 5]), counter()).unwrap();
        // 2 + 3 + 4
        assert_eq!(cm.detect_fraud_with_limit(Proof::new(0, 2), 9), Ok(false));
        assert_eq!(
            cm.detect_fraud_with_limit(Proof::new(0, 2), 8),
            Err(ChallengeError::OutOfGas { used: 9, limit: 8 })
        );
    }

    #[test]
    fn test_unit_cost_machine() {
        let machine = FnMachine::new(|s: &u64| s + 1, |s: &u64| Keccak256Hasher::hash_u64(*s));
        let roots = diverging(50, 30);
        let cm = ChallengeManager::new(commitment(&roots, &[0, 40]), machine).unwrap();
        assert_eq!(cm.detect_fraud_with_limit(Proof::new(0, 0), 40), Ok(true));
        assert!(cm.detect_fraud_with_limit(Proof::new(0, 0), 39).unwrap_err().is_out_of_gas());
    }

    #[test]
    fn test_proof_past_end_is_rejected() {
        let roots = diverging(10, 5);
        let cm = ChallengeManager::new(commitment(&roots, &[0, 4, 9]), counter()).unwrap();
        assert_eq!(
            cm.detect_fraud(Proof::new(2, 9)),
            Err(ChallengeError::InvalidChallengeIndex { index: 2, last: 2 })
        );
        assert!(cm.detect_fraud(Proof::new(usize::MAX, 0)).is_err());
    }

    #[test]
    fn test_resume_from_stored_state() {
        let roots = diverging(10, 5);
        let mut cm = ChallengeManager::new(commitment(&roots, &[0, 9]), counter()).unwrap();
        cm.assert_invalid_step(1).unwrap();
        cm.split(commitment(&roots, &[0, 4, 9])).unwrap();

        let stored = cm.into_state();
        let mut resumed = ChallengeManager::from_state(stored.clone(), counter()).unwrap();
        assert_eq!(resumed.state(), &stored);
        resumed.assert_invalid_step(2).unwrap();
        resumed.split(commitment(&roots, &[4, 6, 9])).unwrap();
        assert_eq!(resumed.commitments().len(), 3);
    }
}
