//! Challenge error kinds

use thiserror::Error;

use crate::types::Step;

/// Every way a protocol move can be rejected.
///
/// All variants except [`ChallengeError::OutOfGas`] are fatal to the call that
/// produced them: the caller must submit a different move. `OutOfGas` means
/// the disputed range is still too wide to replay in one call and must be
/// split further before `detect_fraud` is retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// Sequence too short, or a split with fewer than two sub-intervals
    #[error("invalid commitment length: {len}")]
    InvalidCommitmentLength {
        /// Number of commitments supplied
        len: usize,
    },
    /// There is no pair ending at the first commitment
    #[error("cannot assert first step invalid")]
    CannotAssertFirstStepInvalid,
    /// Index past the end of the current sequence
    #[error("invalid challenge index {index} (last valid index {last})")]
    InvalidChallengeIndex {
        /// Rejected index
        index: usize,
        /// Last valid index of the current sequence
        last: usize,
    },
    /// First commitment of a split does not match the disputed pair
    #[error("first commitment is invalid")]
    FirstCommitmentInvalid,
    /// Last commitment of a split does not match the disputed pair
    #[error("last commitment is invalid")]
    LastCommitmentInvalid,
    /// A step index is not the expected bisection point
    #[error("invalid indices at position {position}: expected step {expected}, got {actual}")]
    InvalidIndices {
        /// Position in the rejected sequence
        position: usize,
        /// Step required at that position
        expected: Step,
        /// Step found at that position
        actual: Step,
    },
    /// Replay exceeded the gas budget on a multi-step range
    #[error("out of gas: used {used}, limit {limit}")]
    OutOfGas {
        /// Gas charged before replay stopped
        used: u64,
        /// Budget of the call
        limit: u64,
    },
}

impl ChallengeError {
    /// Whether the range must be split further before retrying
    pub const fn is_out_of_gas(&self) -> bool {
        matches!(self, Self::OutOfGas { .. })
    }

    /// Whether the move itself was invalid
    pub const fn is_fatal(&self) -> bool {
        !self.is_out_of_gas()
    }
}

/// Result type for challenge operations.
pub type Result<T> = std::result::Result<T, ChallengeError>;
