//! Time-to-live policy: TTL validation and lazy liveness checks.

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::{Entry, EntryStatus};
use crate::error::DomainError;

/// Default upper bound for a TTL: 30 days.
pub const DEFAULT_MAX_TTL_MINUTES: i64 = 43_200;

/// TTL rules for new entries and liveness checks for existing ones.
///
/// Liveness is evaluated at read time; there is no background sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    max_ttl_minutes: i64,
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TTL_MINUTES)
    }
}

impl ExpirationPolicy {
    pub fn new(max_ttl_minutes: i64) -> Self {
        Self { max_ttl_minutes }
    }

    pub fn max_ttl_minutes(&self) -> i64 {
        self.max_ttl_minutes
    }

    /// Validates a requested TTL and converts it to a duration.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTtl`] if `ttl_minutes <= 0` or exceeds the
    /// configured maximum.
    pub fn ttl(&self, ttl_minutes: i64) -> Result<Duration, DomainError> {
        if ttl_minutes <= 0 || ttl_minutes > self.max_ttl_minutes {
            return Err(DomainError::InvalidTtl {
                ttl_minutes,
                max: self.max_ttl_minutes,
            });
        }
        Ok(Duration::minutes(ttl_minutes))
    }

    /// Computes the expiry boundary for an entry created at `created_at`.
    pub fn expires_at(
        &self,
        created_at: DateTime<Utc>,
        ttl_minutes: i64,
    ) -> Result<DateTime<Utc>, DomainError> {
        Ok(created_at + self.ttl(ttl_minutes)?)
    }

    /// The boundary is inclusive: an entry is expired at exactly `expires_at`.
    pub fn is_expired(entry: &Entry, now: DateTime<Utc>) -> bool {
        now >= entry.expires_at
    }

    /// Derives the status of `entry` at `now`. Expiry wins over the paused flag.
    pub fn status(entry: &Entry, now: DateTime<Utc>) -> EntryStatus {
        if Self::is_expired(entry, now) {
            EntryStatus::Expired
        } else if entry.paused {
            EntryStatus::Paused
        } else {
            EntryStatus::Active
        }
    }
}
