//! Snapshot store for dispute records
//!
//! Each move of a dispute may land in a separate invocation. The store keeps
//! the latest [`ChallengeState`] as JSON on disk so the game can pick up
//! where it stopped.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use xlayer_dispute_core::ChallengeState;

/// JSON file holding the latest dispute record
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a new store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing the store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `state`, replacing any previous snapshot
    pub fn save(&self, state: &ChallengeState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state)?;
        // write then rename, so a crash never leaves a torn snapshot
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        debug!(
            "Saved snapshot to {} ({} commitments, pointer {})",
            self.path.display(),
            state.commitments().len(),
            state.incorrect_step_index()
        );
        Ok(())
    }

    /// Read the latest snapshot, if any
    pub fn load(&self) -> Result<Option<ChallengeState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        // decoding checks the record invariants
        let state: ChallengeState = serde_json::from_slice(&bytes)
            .with_context(|| format!("invalid snapshot in {}", self.path.display()))?;
        Ok(Some(state))
    }

    /// Remove the snapshot once the dispute is resolved
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("removing {}", self.path.display()))?;
        }
        Ok(())
    }
}
