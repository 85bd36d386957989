//! Business logic services for the application layer.

pub mod analytics_service;
pub mod link_service;
pub mod listing;
pub mod redirect_service;

pub use analytics_service::{
    Activity, ActivityKind, AnalyticsService, CategoryCount, DailyClicks, Metrics, TimeRange,
    TimeWindow,
};
pub use link_service::{CreateShortUrl, LinkService};
pub use listing::{ListQuery, RegistryOverview, SortOrder, StatusFilter};
pub use redirect_service::{Outcome, RedirectService, ResolutionAttempt, ResolutionState};
