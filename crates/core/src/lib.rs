//! Bisection dispute core
//!
//! This crate contains the protocol state machine shared by every party of a
//! dispute:
//! - The commitment sequence and its dispute pointer ([`ChallengeState`])
//! - The challenge manager that validates splits and replays single steps
//!   ([`ChallengeManager`])
//! - The capability interface for the disputed computation ([`StateMachine`])
//!
//! The core never logs and never retries. Every failure is returned to the
//! caller as a [`ChallengeError`].

pub mod bisection;
pub mod error;
pub mod hasher;
pub mod machine;
pub mod manager;
pub mod state;
pub mod trace;
pub mod types;

pub use bisection::bisection_points;
pub use error::{ChallengeError, Result};
pub use hasher::Keccak256Hasher;
pub use machine::{FnMachine, StateMachine};
pub use manager::{ChallengeManager, DEFAULT_GAS_LIMIT};
pub use state::ChallengeState;
pub use trace::{replay, TraceLog};
pub use types::{Commitment, Digest, Proof, Step};
