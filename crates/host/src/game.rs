//! Dispute game driver
//!
//! Plays a [`Sequencer`] against a [`Verifier`] over one
//! [`ChallengeManager`]. Each round the verifier tries to prove fraud on the
//! first pair it disagrees with. While that range is too wide to replay within
//! the gas budget, the verifier asserts it invalid and the sequencer splits
//! it, until a single affordable replay settles the dispute.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use xlayer_dispute_core::{ChallengeManager, Commitment, StateMachine};

use crate::config::Config;
use crate::sequencer::Sequencer;
use crate::store::SnapshotStore;
use crate::verifier::Verifier;

/// How a game ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The verifier agreed with every commitment, nothing was disputed
    NoDispute,
    /// Replay disagreed with the sequencer's commitment
    FraudProven,
    /// Replay matched the sequencer's commitment
    ClaimUpheld,
}

/// Result of a finished game
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// How the game ended
    pub verdict: Verdict,
    /// Fraud detection attempts made
    pub rounds: u32,
    /// Pair replayed by the final fraud detection
    pub disputed: Option<(Commitment, Commitment)>,
    /// Commitment sequence when the game ended
    pub commitments: Vec<Commitment>,
}

/// Game between a sequencer and a verifier
pub struct DisputeGame<M: StateMachine> {
    manager: ChallengeManager<M>,
    sequencer: Sequencer,
    verifier: Verifier<M>,
    store: Option<SnapshotStore>,
    gas_limit: u64,
    max_rounds: u32,
    fan_out: u64,
    round_interval: Duration,
}

impl<M: StateMachine + Clone> DisputeGame<M> {
    /// Set up a game, resuming from the configured snapshot when one exists
    pub fn new(
        config: &Config,
        machine: M,
        genesis: M::State,
        sequencer: Sequencer,
    ) -> Result<Self> {
        config.validate()?;

        let verifier = Verifier::new(machine.clone(), genesis, config.last_step());
        let store = config.snapshot_path.as_ref().map(SnapshotStore::new);

        let manager = match store.as_ref().map(SnapshotStore::load).transpose()?.flatten() {
            Some(state) => {
                info!(
                    "Resuming dispute with {} commitments, pointer {}",
                    state.commitments().len(),
                    state.incorrect_step_index()
                );
                ChallengeManager::from_state(state, machine)?
            }
            None => {
                let initial = sequencer.initial_commitments(&config.checkpoints)?;
                ChallengeManager::new(initial, machine).context("opening dispute")?
            }
        };

        Ok(Self {
            manager,
            sequencer,
            verifier,
            store,
            gas_limit: config.gas_limit,
            max_rounds: config.max_rounds,
            fan_out: config.fan_out,
            round_interval: config.round_interval(),
        })
    }

    /// Challenge manager of the game
    pub const fn manager(&self) -> &ChallengeManager<M> {
        &self.manager
    }

    /// Play rounds until the dispute resolves or the round limit is reached
    pub async fn run(&mut self) -> Result<GameOutcome> {
        info!(
            "Dispute opened: {}",
            format_commitments(self.manager.commitments())
        );

        for round in 1..=self.max_rounds {
            // 1. Verifier posts the last correct commitment
            let Some(proof) = self.verifier.proof_for(self.manager.commitments())? else {
                info!("Verifier agrees with every commitment, nothing to dispute");
                self.finish()?;
                return Ok(self.outcome(Verdict::NoDispute, round - 1, None));
            };

            let starting_at = proof.starting_at;
            let commitments = self.manager.commitments();
            let pair = (commitments[starting_at], commitments[starting_at + 1]);
            info!("Round {}: detecting fraud on {} .. {}", round, pair.0, pair.1);

            match self.manager.detect_fraud_with_limit(proof, self.gas_limit) {
                Ok(fraud) => {
                    let verdict = if fraud {
                        Verdict::FraudProven
                    } else {
                        Verdict::ClaimUpheld
                    };
                    info!("Round {}: {:?} on {} .. {}", round, verdict, pair.0, pair.1);
                    self.finish()?;
                    return Ok(self.outcome(verdict, round, Some(pair)));
                }
                Err(e) if e.is_out_of_gas() => {
                    debug!(
                        "Round {}: {}, asserting step {} invalid",
                        round,
                        e,
                        starting_at + 1
                    );
                    self.manager
                        .assert_invalid_step(starting_at + 1)
                        .context("verifier assertion rejected")?;
                }
                Err(e) => return Err(e).context("fraud detection rejected"),
            }
            self.persist()?;
            self.pause().await;

            // 2. Sequencer bisects the asserted pair
            let split = self.sequencer.propose_split(self.manager.state(), self.fan_out)?;
            info!(
                "Round {}: sequencer splits into {}",
                round,
                format_commitments(&split)
            );
            self.manager.split(split).context("sequencer split rejected")?;
            self.persist()?;
            self.pause().await;
        }

        warn!("Dispute unresolved after {} rounds", self.max_rounds);
        bail!("dispute unresolved after {} rounds", self.max_rounds)
    }

    fn outcome(
        &self,
        verdict: Verdict,
        rounds: u32,
        disputed: Option<(Commitment, Commitment)>,
    ) -> GameOutcome {
        GameOutcome {
            verdict,
            rounds,
            disputed,
            commitments: self.manager.commitments().to_vec(),
        }
    }

    fn persist(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(self.manager.state()),
            None => Ok(()),
        }
    }

    fn finish(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }

    async fn pause(&self) {
        if !self.round_interval.is_zero() {
            tokio::time::sleep(self.round_interval).await;
        }
    }
}

impl<M: StateMachine> fmt::Debug for DisputeGame<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisputeGame")
            .field("state", self.manager.state())
            .field("store", &self.store)
            .field("gas_limit", &self.gas_limit)
            .field("max_rounds", &self.max_rounds)
            .field("fan_out", &self.fan_out)
            .field("round_interval", &self.round_interval)
            .finish_non_exhaustive()
    }
}

fn format_commitments(commitments: &[Commitment]) -> String {
    let parts: Vec<String> = commitments.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
