//! JSON persisted-state shape for the registry.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::entities::{ClickEvent, Entry};
use crate::error::DomainError;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialisable copy of the registry: one record per entry and the
/// append-only click log keyed by `entryId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub entries: Vec<Entry>,
    pub clicks: Vec<ClickEvent>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl Snapshot {
    pub fn new(entries: Vec<Entry>, clicks: Vec<ClickEvent>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entries,
            clicks,
        }
    }

    /// Reads a snapshot file. A missing file yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Snapshot`] on I/O errors, malformed JSON or an
    /// unsupported version.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No snapshot at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DomainError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        Ok(snapshot)
    }

    /// Writes the snapshot atomically: a sibling temp file is renamed over `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Snapshot`] on I/O or serialisation errors.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DomainError> {
        let path = path.as_ref();
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;

        tracing::debug!(
            entries = self.entries.len(),
            clicks = self.clicks.len(),
            "Snapshot written to {}",
            path.display()
        );
        Ok(())
    }
}
