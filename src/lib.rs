//! # linkshrinker
//!
//! A short-code registry and redirection engine: maps short tokens to
//! destination URLs under a time-to-live policy, resolves lookups through a
//! small state machine, and aggregates click events into analytics.
//!
//! ## Architecture
//!
//! The crate keeps a strict layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, expiration policy, clock and repository traits
//! - **Application Layer** ([`application`]) - Create/resolve/delete/list/analytics services
//! - **Infrastructure Layer** ([`infrastructure`]) - In-memory registry and JSON snapshots
//! - **State** ([`state`]) - Dependency-injected container owning one registry
//!
//! Rendering, transport and authentication are left to callers. The bundled
//! `admin` binary is one such caller.
//!
//! ## Quick Start
//!
//! ```ignore
//! use linkshrinker::prelude::*;
//!
//! let state = AppState::new(&Config::default());
//! let entry = state.create_short_url(CreateShortUrl::new("https://example.com/a", 30))?;
//! let outcome = state.resolve_short_url(&entry.short_code, ClickContext::default())?;
//! assert_eq!(outcome.destination(), Some("https://example.com/a"));
//! ```
//!
//! ## Configuration
//!
//! Limits are loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod state;
pub mod utils;

pub use error::DomainError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AnalyticsService, CreateShortUrl, LinkService, ListQuery, Metrics, Outcome,
        RedirectService, ResolutionState, SortOrder, StatusFilter, TimeRange, TimeWindow,
    };
    pub use crate::config::Config;
    pub use crate::domain::clock::{Clock, ManualClock, SystemClock};
    pub use crate::domain::entities::{ClickContext, ClickEvent, DeviceClass, Entry, EntryStatus};
    pub use crate::error::DomainError;
    pub use crate::infrastructure::persistence::{InMemoryRegistry, Snapshot};
    pub use crate::state::AppState;
}
