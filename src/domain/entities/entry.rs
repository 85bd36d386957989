//! Entry entity representing a short-code registration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::expiration::ExpirationPolicy;

/// Derived lifecycle status of an [`Entry`].
///
/// Never stored: computed on read from the entry timestamps and the explicit
/// `paused` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Paused,
    Expired,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short code registered against a destination URL.
///
/// Only `click_count`, `last_click_at`, `paused` and `deleted_at` change after
/// creation. Serialises to the persisted record shape
/// `{ id, shortCode, originalUrl, createdAt, expiresAt, clickCount, lastClickAt, paused }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub click_count: u64,
    pub last_click_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Creates a fresh, never-clicked entry from validated input.
    pub fn new(id: i64, new_entry: NewEntry) -> Self {
        Self {
            id,
            short_code: new_entry.short_code,
            original_url: new_entry.original_url,
            created_at: new_entry.created_at,
            expires_at: new_entry.expires_at,
            click_count: 0,
            last_click_at: None,
            paused: false,
            deleted_at: None,
        }
    }

    /// Returns true if the entry has been removed from the live index.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the derived status at `now`.
    pub fn status(&self, now: DateTime<Utc>) -> EntryStatus {
        ExpirationPolicy::status(self, now)
    }

    /// Returns true if the entry may be redirected to at `now`.
    pub fn is_resolvable(&self, now: DateTime<Utc>) -> bool {
        !self.is_deleted() && self.status(now) == EntryStatus::Active
    }

    /// Time left until expiry, or `None` once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        (now < self.expires_at).then(|| self.expires_at - now)
    }

    /// Builds the public short URL for this entry under `base_url`.
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.short_code)
    }
}

/// Validated input for registering a new entry.
///
/// Produced by [`crate::application::services::LinkService`] after URL, TTL and
/// code validation; the registry only enforces code uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
