//! Capability interface for the disputed computation
//!
//! The core never looks inside a state. It only hands states to a
//! [`StateMachine`] to advance them, price them and canonicalize them.

use std::fmt;
use std::marker::PhantomData;

use crate::types::Digest;

/// One unit of the disputed computation.
///
/// Implementations must be pure and deterministic, and `step` must be total
/// over every reachable state.
pub trait StateMachine {
    /// Opaque state of the computation
    type State: Clone;

    /// Advance the state by exactly one step
    fn step(&self, state: &Self::State) -> Self::State;

    /// Commitment root for a state
    fn canonicalize(&self, state: &Self::State) -> Digest;

    /// Gas charged for advancing `state` by one step during fraud detection
    fn step_cost(&self, _state: &Self::State) -> u64 {
        1
    }
}

impl<M: StateMachine + ?Sized> StateMachine for &M {
    type State = M::State;

    fn step(&self, state: &Self::State) -> Self::State {
        (**self).step(state)
    }

    fn canonicalize(&self, state: &Self::State) -> Digest {
        (**self).canonicalize(state)
    }

    fn step_cost(&self, state: &Self::State) -> u64 {
        (**self).step_cost(state)
    }
}

fn unit_cost<S>(_state: &S) -> u64 {
    1
}

/// [`StateMachine`] built from plain closures
pub struct FnMachine<S, P, F, C = fn(&S) -> u64> {
    step: P,
    canonicalize: F,
    cost: C,
    _state: PhantomData<fn(&S) -> S>,
}

impl<S, P, F> FnMachine<S, P, F>
where
    P: Fn(&S) -> S,
    F: Fn(&S) -> Digest,
{
    /// Create a machine charging one unit of gas per step
    pub fn new(step: P, canonicalize: F) -> Self {
        Self {
            step,
            canonicalize,
            cost: unit_cost::<S>,
            _state: PhantomData,
        }
    }
}

impl<S, P, F, C> FnMachine<S, P, F, C> {
    /// Replace the cost model
    pub fn with_cost<C2>(self, cost: C2) -> FnMachine<S, P, F, C2>
    where
        C2: Fn(&S) -> u64,
    {
        FnMachine {
            step: self.step,
            canonicalize: self.canonicalize,
            cost,
            _state: PhantomData,
        }
    }
}

impl<S, P, F, C> StateMachine for FnMachine<S, P, F, C>
where
    S: Clone,
    P: Fn(&S) -> S,
    F: Fn(&S) -> Digest,
    C: Fn(&S) -> u64,
{
    type State = S;

    fn step(&self, state: &S) -> S {
        (self.step)(state)
    }

    fn canonicalize(&self, state: &S) -> Digest {
        (self.canonicalize)(state)
    }

    fn step_cost(&self, state: &S) -> u64 {
        (self.cost)(state)
    }
}

impl<S, P, F, C> fmt::Debug for FnMachine<S, P, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMachine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Keccak256Hasher;

    #[test]
    fn test_fn_machine_defaults_to_unit_cost() {
        let machine = FnMachine::new(|s: &u64| s + 1, |s: &u64| Keccak256Hasher::hash_u64(*s));
        assert_eq!(machine.step(&4), 5);
        assert_eq!(machine.step_cost(&1_000), 1);
        assert_eq!(machine.canonicalize(&4), Keccak256Hasher::hash_u64(4));
    }

    #[test]
    fn test_fn_machine_with_cost() {
        let machine = FnMachine::new(|s: &u64| s + 1, |s: &u64| Keccak256Hasher::hash_u64(*s))
            .with_cost(|s: &u64| *s * 2);
        assert_eq!(machine.step_cost(&7), 14);
        assert_eq!(machine.step(&7), 8);
    }

    #[test]
    fn test_reference_forwards() {
        let machine = FnMachine::new(|s: &u64| s + 3, |s: &u64| Keccak256Hasher::hash_u64(*s));
        let by_ref = &machine;
        assert_eq!(StateMachine::step(&by_ref, &1), 4);
    }
}
