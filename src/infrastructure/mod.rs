//! Infrastructure layer implementing the domain repository traits.
//!
//! # Modules
//!
//! - [`persistence`] - In-memory registry and its JSON snapshot

pub mod persistence;
