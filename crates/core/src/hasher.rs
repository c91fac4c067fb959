//! Keccak256 hasher for state canonicalization

use tiny_keccak::{Hasher, Keccak};

use crate::types::Digest;

/// Keccak256 hasher
#[derive(Debug)]
pub struct Keccak256Hasher;

impl Keccak256Hasher {
    /// Hash a single value
    pub fn hash(data: &[u8]) -> Digest {
        let mut hasher = Keccak::v256();
        hasher.update(data);
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output
    }

    /// Hash two digests together
    pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
        let mut hasher = Keccak::v256();
        hasher.update(left);
        hasher.update(right);
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output
    }

    /// Digest of a `u64` state, encoded little-endian
    pub fn hash_u64(value: u64) -> Digest {
        Self::hash(&value.to_le_bytes())
    }
}
