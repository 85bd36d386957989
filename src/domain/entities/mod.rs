//! Core domain entities.
//!
//! - [`Entry`] - A short code registered against a destination URL
//! - [`ClickEvent`] - One successful resolution of an entry
//!
//! Creation input is kept separate from the stored record:
//! [`NewEntry`] for registrations, [`ClickContext`] for the request metadata
//! that becomes a click event.

pub mod click;
pub mod entry;

pub use click::{ClickContext, ClickEvent, DeviceClass};
pub use entry::{Entry, EntryStatus, NewEntry};
