//! Domain layer containing business entities and rules.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//! - [`expiration`] - TTL validation and liveness
//! - [`clock`] - Injectable time source
//!
//! The domain layer has no dependencies on infrastructure. Orchestration lives
//! in [`crate::application::services`].

pub mod clock;
pub mod entities;
pub mod expiration;
pub mod repositories;
