//! Dependency-injected registry state with an explicit lifecycle.
//!
//! An [`AppState`] is built once at process start, shared by reference (it
//! is cheap to clone), and consumed by [`AppState::shutdown`], which hands
//! back the final [`Snapshot`] for the caller to persist.

use std::sync::Arc;

use crate::application::services::{
    AnalyticsService, CreateShortUrl, LinkService, ListQuery, Metrics, Outcome, RedirectService,
    TimeWindow,
};
use crate::config::Config;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::{ClickContext, Entry};
use crate::domain::expiration::ExpirationPolicy;
use crate::error::DomainError;
use crate::infrastructure::persistence::{InMemoryRegistry, Snapshot};
use crate::utils::code_generator::{CodeGenerator, RandomCodeGenerator};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<InMemoryRegistry>,
    pub links: Arc<LinkService<InMemoryRegistry>>,
    pub redirects: Arc<RedirectService<InMemoryRegistry>>,
    pub analytics: Arc<AnalyticsService<InMemoryRegistry, InMemoryRegistry>>,
    pub clock: Arc<dyn Clock>,
    pub base_url: String,
}

impl AppState {
    /// Empty registry on the system clock.
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config,
            Arc::new(InMemoryRegistry::new()),
            Arc::new(SystemClock),
            Arc::new(RandomCodeGenerator),
        )
    }

    /// Restores the registry from `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Snapshot`] if the snapshot is inconsistent.
    pub fn from_snapshot(
        config: &Config,
        snapshot: Snapshot,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let registry = InMemoryRegistry::from_snapshot(snapshot)?;
        Ok(Self::with_parts(
            config,
            Arc::new(registry),
            clock,
            Arc::new(RandomCodeGenerator),
        ))
    }

    /// Wires the services around caller-supplied collaborators.
    pub fn with_parts(
        config: &Config,
        registry: Arc<InMemoryRegistry>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        let links = LinkService::new(
            registry.clone(),
            generator,
            clock.clone(),
            ExpirationPolicy::new(config.max_ttl_minutes),
            config.code_generation_attempts,
        );
        let redirects = RedirectService::new(registry.clone(), clock.clone());
        let analytics = AnalyticsService::new(
            registry.clone(),
            registry.clone(),
            clock.clone(),
            config.recent_activity_limit,
        );

        tracing::debug!(entries = registry.len(), "Registry state initialised");

        Self {
            registry,
            links: Arc::new(links),
            redirects: Arc::new(redirects),
            analytics: Arc::new(analytics),
            clock,
            base_url: config.base_url.clone(),
        }
    }

    pub fn create_short_url(&self, request: CreateShortUrl) -> Result<Entry, DomainError> {
        self.links.create(request)
    }

    pub fn resolve_short_url(
        &self,
        short_code: &str,
        context: ClickContext,
    ) -> Result<Outcome, DomainError> {
        self.redirects.resolve(short_code, context)
    }

    pub fn delete_short_url(&self, id: i64) -> Result<Entry, DomainError> {
        self.links.delete(id)
    }

    pub fn list_short_urls(&self, query: &ListQuery) -> Result<Vec<Entry>, DomainError> {
        self.links.list(query)
    }

    pub fn get_analytics(&self, entry_id: i64, window: TimeWindow) -> Result<Metrics, DomainError> {
        self.analytics.summarize(entry_id, window)
    }

    /// Captures the current registry contents without ending the lifecycle.
    pub fn snapshot(&self) -> Snapshot {
        self.registry.to_snapshot()
    }

    /// Ends the lifecycle and returns the final registry contents.
    pub fn shutdown(self) -> Snapshot {
        let snapshot = self.registry.to_snapshot();
        tracing::debug!(
            entries = snapshot.entries.len(),
            clicks = snapshot.clicks.len(),
            "Registry state shut down"
        );
        snapshot
    }
}
