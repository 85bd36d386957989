//! Repository trait for the append-only click log.

use chrono::{DateTime, Utc};

use crate::domain::entities::ClickEvent;
use crate::error::DomainError;

/// Read access to the click log, plus the explicit purge hook.
///
/// Events are appended by [`super::EntryRepository::record_click`] only.
#[cfg_attr(test, mockall::automock)]
pub trait ClickRepository: Send + Sync {
    /// Returns the events of `entry_id` with `from <= timestamp < to`, oldest first.
    ///
    /// `None` bounds are open.
    fn clicks_for_entry(
        &self,
        entry_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ClickEvent>, DomainError>;

    /// Returns up to `limit` events of non-deleted entries, newest first.
    fn recent_clicks(&self, limit: usize) -> Result<Vec<ClickEvent>, DomainError>;

    /// Removes every event of `entry_id`, returning how many were dropped.
    ///
    /// Click counters are not touched.
    fn purge_clicks(&self, entry_id: i64) -> Result<usize, DomainError>;
}
