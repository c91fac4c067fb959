//! Demo computation
//!
//! A counter that adds one per step. Each step costs the counter's current
//! value in gas, so later parts of the trace get more expensive to replay.

use xlayer_dispute_core::{Digest, Keccak256Hasher, StateMachine, Step, TraceLog};

/// Salt mixed into roots past the fault, so they differ from honest ones
const FAULT_TAG: Digest = [0x01; 32];

/// Counter machine used by the demo binary and tests
#[derive(Clone, Copy, Debug, Default)]
pub struct CounterMachine;

impl StateMachine for CounterMachine {
    type State = u64;

    fn step(&self, state: &u64) -> u64 {
        state + 1
    }

    fn canonicalize(&self, state: &u64) -> Digest {
        Keccak256Hasher::hash_u64(*state)
    }

    fn step_cost(&self, state: &u64) -> u64 {
        *state
    }
}

/// Roots of a `trace_length`-state counter trace that goes wrong at `fault_at`
pub fn faulty_roots(trace_length: u64, fault_at: Step) -> Vec<Digest> {
    (0..trace_length)
        .map(|value| {
            let honest = CounterMachine.canonicalize(&value);
            if value < fault_at {
                honest
            } else {
                Keccak256Hasher::hash_pair(&honest, &FAULT_TAG)
            }
        })
        .collect()
}

/// Trace log of a sequencer whose trace goes wrong at `fault_at`
pub fn faulty_log(trace_length: u64, fault_at: Step) -> TraceLog {
    TraceLog::from_roots(faulty_roots(trace_length, fault_at))
}
