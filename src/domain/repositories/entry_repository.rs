//! Repository trait for the short-code registry.

use chrono::{DateTime, Utc};

use crate::domain::entities::{ClickEvent, Entry, NewEntry};
use crate::error::DomainError;

/// The authoritative store of short-code → entry mappings.
///
/// Every method is a single atomic step with respect to concurrent callers.
/// Implementations never block beyond their own critical section.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::InMemoryRegistry`] - lock-guarded in-memory store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
pub trait EntryRepository: Send + Sync {
    /// Registers a new entry, reserving its short code.
    ///
    /// The uniqueness check and the insert happen under one lock. A code held
    /// by an entry that is expired at `new_entry.created_at` is taken over; the
    /// old entry stays readable by id.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DuplicateShortCode`] if a live entry holds the code.
    fn insert(&self, new_entry: NewEntry) -> Result<Entry, DomainError>;

    /// Finds the entry currently indexed under `code`, expired or not.
    fn find_by_code(&self, code: &str) -> Result<Option<Entry>, DomainError>;

    /// Finds an entry by id, including deleted and superseded entries.
    fn find_by_id(&self, id: i64) -> Result<Option<Entry>, DomainError>;

    /// Returns every entry that has not been deleted, in id order.
    fn list(&self) -> Result<Vec<Entry>, DomainError>;

    /// Increments the click counter of `event.entry_id` and appends `event`
    /// to the click log as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if the entry is missing or deleted.
    /// Returns [`DomainError::Expired`] if the entry is expired or paused at
    /// `event.timestamp`; nothing is recorded in that case.
    fn record_click(&self, event: ClickEvent) -> Result<Entry, DomainError>;

    /// Removes an entry from the live index. Its click events are kept.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if the entry is missing or already deleted.
    fn delete(&self, id: i64, at: DateTime<Utc>) -> Result<Entry, DomainError>;

    /// Sets or clears the explicit paused override.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if the entry is missing or deleted.
    fn set_paused(&self, id: i64, paused: bool) -> Result<Entry, DomainError>;
}
