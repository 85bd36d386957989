//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract; the in-memory implementation lives in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for service tests.
//!
//! - [`EntryRepository`] - Code reservation, lookup, click recording, deletion
//! - [`ClickRepository`] - Click log reads and purge

pub mod click_repository;
pub mod entry_repository;

pub use click_repository::ClickRepository;
pub use entry_repository::EntryRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use entry_repository::MockEntryRepository;
