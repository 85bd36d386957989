//! Redirection resolution with click recording.
//!
//! A resolution is a small state machine: it starts in
//! [`ResolutionState::Attempting`] and settles in exactly one of
//! `Redirecting`, `Expired` or `Invalid`. Once settled it never changes.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{ClickContext, Entry, EntryStatus};
use crate::domain::repositories::EntryRepository;
use crate::error::DomainError;

/// Lifecycle state of a [`ResolutionAttempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionState {
    Attempting,
    Redirecting,
    Expired,
    Invalid,
}

impl ResolutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attempting => "attempting",
            Self::Redirecting => "redirecting",
            Self::Expired => "expired",
            Self::Invalid => "invalid",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting)
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The code is live; the click has been recorded.
    Redirect { destination: String, entry: Entry },
    /// The code exists but is expired or paused.
    Expired { short_code: String },
    /// Nothing holds the code.
    Invalid { short_code: String },
}

impl Outcome {
    pub fn state(&self) -> ResolutionState {
        match self {
            Self::Redirect { .. } => ResolutionState::Redirecting,
            Self::Expired { .. } => ResolutionState::Expired,
            Self::Invalid { .. } => ResolutionState::Invalid,
        }
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Redirect { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Converts to the plain `Result` form: destination URL or error kind.
    pub fn into_destination(self) -> Result<String, DomainError> {
        match self {
            Self::Redirect { destination, .. } => Ok(destination),
            Self::Expired { short_code } => Err(DomainError::Expired { code: short_code }),
            Self::Invalid { short_code } => Err(DomainError::Invalid { code: short_code }),
        }
    }
}

/// One in-flight resolution of a short code.
#[derive(Debug, Clone)]
pub struct ResolutionAttempt {
    short_code: String,
    context: ClickContext,
    outcome: Option<Outcome>,
}

impl ResolutionAttempt {
    pub fn short_code(&self) -> &str {
        &self.short_code
    }

    pub fn state(&self) -> ResolutionState {
        self.outcome
            .as_ref()
            .map_or(ResolutionState::Attempting, Outcome::state)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }
}

/// Resolves short codes to destinations and records successful clicks.
pub struct RedirectService<R: EntryRepository> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: EntryRepository> RedirectService<R> {
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Opens a resolution in the `Attempting` state. Nothing is read yet.
    pub fn begin(&self, short_code: impl Into<String>, context: ClickContext) -> ResolutionAttempt {
        ResolutionAttempt {
            short_code: short_code.into(),
            context,
            outcome: None,
        }
    }

    /// Drives `attempt` to a terminal state.
    ///
    /// Polling a settled attempt returns the same outcome without touching
    /// the registry again, so a click is recorded at most once per attempt.
    ///
    /// # Errors
    ///
    /// Registry failures are propagated and leave the attempt in `Attempting`.
    pub fn poll(&self, attempt: &mut ResolutionAttempt) -> Result<Outcome, DomainError> {
        if let Some(outcome) = &attempt.outcome {
            return Ok(outcome.clone());
        }

        let outcome = self.settle(&attempt.short_code, &attempt.context)?;

        metrics::counter!("redirects_total", "outcome" => outcome.state().as_str()).increment(1);
        match &outcome {
            Outcome::Redirect { entry, .. } => info!(
                short_code = %attempt.short_code,
                id = entry.id,
                clicks = entry.click_count,
                "Redirecting"
            ),
            other => warn!(
                short_code = %attempt.short_code,
                outcome = %other.state(),
                "Resolution refused"
            ),
        }

        attempt.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Begins and settles a resolution in one step.
    pub fn resolve(
        &self,
        short_code: impl Into<String>,
        context: ClickContext,
    ) -> Result<Outcome, DomainError> {
        let mut attempt = self.begin(short_code, context);
        self.poll(&mut attempt)
    }

    fn settle(&self, short_code: &str, context: &ClickContext) -> Result<Outcome, DomainError> {
        let now = self.clock.now();
        debug!(short_code, "Resolution attempt");

        let entry = match self.repository.find_by_code(short_code)? {
            Some(entry) => entry,
            None => return Ok(invalid(short_code)),
        };

        if entry.status(now) != EntryStatus::Active {
            return Ok(expired(short_code));
        }

        // The registry re-checks liveness under its lock, so a delete or
        // expiry racing this read is caught there.
        match self
            .repository
            .record_click(context.clone().into_event(entry.id, now))
        {
            Ok(updated) => Ok(Outcome::Redirect {
                destination: updated.original_url.clone(),
                entry: updated,
            }),
            Err(DomainError::NotFound { .. }) => Ok(invalid(short_code)),
            Err(DomainError::Expired { .. }) => Ok(expired(short_code)),
            Err(e) => Err(e),
        }
    }
}

fn invalid(short_code: &str) -> Outcome {
    Outcome::Invalid {
        short_code: short_code.to_string(),
    }
}

fn expired(short_code: &str) -> Outcome {
    Outcome::Expired {
        short_code: short_code.to_string(),
    }
}
