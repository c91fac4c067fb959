//! Host-side logic for bisection disputes
//!
//! The two parties of a dispute and the loop that plays them against a
//! [`xlayer_dispute_core::ChallengeManager`].

pub mod config;
pub mod demo;
pub mod game;
pub mod sequencer;
pub mod store;
pub mod verifier;

pub use config::Config;
pub use demo::CounterMachine;
pub use game::{DisputeGame, GameOutcome, Verdict};
pub use sequencer::Sequencer;
pub use store::SnapshotStore;
pub use verifier::Verifier;
