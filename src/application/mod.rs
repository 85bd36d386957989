//! Application layer services implementing the registry operations.
//!
//! Services are generic over the repository traits and receive their
//! collaborators (clock, code generator, expiration policy) at construction.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Create, delete, pause and list entries
//! - [`services::redirect_service::RedirectService`] - Short code resolution state machine
//! - [`services::analytics_service::AnalyticsService`] - Click metrics and activity feed

pub mod services;
