//! Entry creation, deletion and listing service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::application::services::listing::{ListQuery, RegistryOverview};
use crate::domain::clock::Clock;
use crate::domain::entities::{Entry, NewEntry};
use crate::domain::expiration::ExpirationPolicy;
use crate::domain::repositories::EntryRepository;
use crate::error::DomainError;
use crate::utils::code_generator::{CodeGenerator, validate_custom_code};
use crate::utils::url_validator::validate_url;

/// Default number of generated codes tried before giving up.
pub const DEFAULT_GENERATION_ATTEMPTS: usize = 10;

/// Input of [`LinkService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateShortUrl {
    pub original_url: String,
    pub custom_code: Option<String>,
    pub ttl_minutes: i64,
}

impl CreateShortUrl {
    pub fn new(original_url: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            original_url: original_url.into(),
            custom_code: None,
            ttl_minutes,
        }
    }

    pub fn with_custom_code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = Some(code.into());
        self
    }
}

/// Service for registering, removing and listing short codes.
///
/// Validates every input before touching the registry, so a rejected request
/// leaves no trace. Generated codes are retried on collision a bounded number
/// of times; custom codes are tried exactly once.
pub struct LinkService<R: EntryRepository> {
    repository: Arc<R>,
    generator: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    policy: ExpirationPolicy,
    max_attempts: usize,
}

impl<R: EntryRepository> LinkService<R> {
    /// Creates a new link service.
    pub fn new(
        repository: Arc<R>,
        generator: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
        policy: ExpirationPolicy,
        max_attempts: usize,
    ) -> Self {
        Self {
            repository,
            generator,
            clock,
            policy,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Registers a new short code for `request.original_url`.
    ///
    /// # Validation order
    ///
    /// 1. Destination URL must be absolute HTTP(S)
    /// 2. TTL must be within `1..=max_ttl_minutes`
    /// 3. Custom code (if any) must be 3-32 chars of `[A-Za-z0-9_-]`
    ///
    /// # Errors
    ///
    /// Returns the validation error of the first failing check.
    /// Returns [`DomainError::DuplicateShortCode`] if a custom code is held by a live entry.
    /// Returns [`DomainError::GenerationExhausted`] if every generated candidate collided.
    pub fn create(&self, request: CreateShortUrl) -> Result<Entry, DomainError> {
        validate_url(&request.original_url).map_err(|e| DomainError::InvalidUrl {
            url: request.original_url.clone(),
            reason: e.to_string(),
        })?;

        let created_at = self.clock.now();
        let expires_at = self.policy.expires_at(created_at, request.ttl_minutes)?;

        if let Some(code) = &request.custom_code {
            validate_custom_code(code)?;
        }

        let entry = match request.custom_code {
            Some(code) => {
                let entry = self.repository.insert(NewEntry {
                    short_code: code,
                    original_url: request.original_url,
                    created_at,
                    expires_at,
                })?;
                metrics::counter!("links_created_total", "kind" => "custom").increment(1);
                entry
            }
            None => {
                let entry =
                    self.insert_generated(request.original_url, created_at, expires_at)?;
                metrics::counter!("links_created_total", "kind" => "generated").increment(1);
                entry
            }
        };

        info!(
            id = entry.id,
            short_code = %entry.short_code,
            expires_at = %entry.expires_at,
            "Short code registered"
        );

        Ok(entry)
    }

    fn insert_generated(
        &self,
        original_url: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Entry, DomainError> {
        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate();

            match self.repository.insert(NewEntry {
                short_code: code.clone(),
                original_url: original_url.clone(),
                created_at,
                expires_at,
            }) {
                Ok(entry) => return Ok(entry),
                Err(DomainError::DuplicateShortCode { .. }) => {
                    debug!(attempt, code = %code, "Generated code collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = self.max_attempts,
            "Short code generation exhausted"
        );
        metrics::counter!("code_generation_exhausted_total").increment(1);

        Err(DomainError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Removes an entry from the live index; its code becomes free at once.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if the entry is missing or already deleted.
    pub fn delete(&self, id: i64) -> Result<Entry, DomainError> {
        let entry = self.repository.delete(id, self.clock.now())?;
        info!(id, short_code = %entry.short_code, "Entry deleted");
        Ok(entry)
    }

    /// Stops an entry from resolving without deleting it.
    pub fn pause(&self, id: i64) -> Result<Entry, DomainError> {
        let entry = self.repository.set_paused(id, true)?;
        info!(id, short_code = %entry.short_code, "Entry paused");
        Ok(entry)
    }

    /// Clears the paused override. Time-based expiry still applies.
    pub fn resume(&self, id: i64) -> Result<Entry, DomainError> {
        let entry = self.repository.set_paused(id, false)?;
        info!(id, short_code = %entry.short_code, "Entry resumed");
        Ok(entry)
    }

    /// Fetches an entry by id, deleted ones included.
    pub fn get(&self, id: i64) -> Result<Entry, DomainError> {
        self.repository
            .find_by_id(id)?
            .ok_or_else(|| DomainError::entry_not_found(id))
    }

    /// Fetches the entry currently holding `code`.
    pub fn lookup(&self, code: &str) -> Result<Entry, DomainError> {
        self.repository
            .find_by_code(code)?
            .ok_or_else(|| DomainError::code_not_found(code))
    }

    /// Lists live entries matching `query`, ordered as it asks.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<Entry>, DomainError> {
        let entries = self.repository.list()?;
        Ok(query.apply(entries, self.clock.now()))
    }

    /// Counts entries by status and sums their clicks.
    pub fn overview(&self) -> Result<RegistryOverview, DomainError> {
        let entries = self.repository.list()?;
        Ok(RegistryOverview::from_entries(&entries, self.clock.now()))
    }

    pub fn policy(&self) -> &ExpirationPolicy {
        &self.policy
    }
}
