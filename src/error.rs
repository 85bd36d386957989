//! Domain error taxonomy shared by every layer of the registry.

use chrono::{DateTime, Utc};

/// Errors returned by registry, resolution and analytics operations.
///
/// All variants are ordinary result values: none of them signal a broken
/// registry. Validation variants are produced before any mutation happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("TTL must be between 1 and {max} minutes, got {ttl_minutes}")]
    InvalidTtl { ttl_minutes: i64, max: i64 },

    #[error("Short code must be at least {min} characters, got {length}")]
    TooShort { length: usize, min: usize },

    #[error("Short code must be at most {max} characters, got {length}")]
    TooLong { length: usize, max: usize },

    #[error("Short code '{code}' contains '{invalid}', only letters, digits, '-' and '_' are allowed")]
    InvalidCharset { code: String, invalid: char },

    #[error("Short code '{code}' is already held by a live entry")]
    DuplicateShortCode { code: String },

    #[error("Failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },

    #[error("Short code '{code}' has expired")]
    Expired { code: String },

    #[error("Short code '{code}' does not resolve to any entry")]
    Invalid { code: String },

    #[error("Analytics window end {end} must be after start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl DomainError {
    pub fn entry_not_found(id: i64) -> Self {
        Self::NotFound {
            resource: "Entry",
            key: id.to_string(),
        }
    }

    pub fn code_not_found(code: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "Short code",
            key: code.into(),
        }
    }

    /// Stable machine-readable code for collaborators that serialise errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::InvalidTtl { .. } => "invalid_ttl",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::InvalidCharset { .. } => "invalid_charset",
            Self::DuplicateShortCode { .. } => "duplicate_short_code",
            Self::GenerationExhausted { .. } => "generation_exhausted",
            Self::NotFound { .. } => "not_found",
            Self::Expired { .. } => "expired",
            Self::Invalid { .. } => "invalid",
            Self::InvalidWindow { .. } => "invalid_window",
            Self::Snapshot(_) => "snapshot",
        }
    }

    /// Returns true for errors raised by input validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. }
                | Self::InvalidTtl { .. }
                | Self::TooShort { .. }
                | Self::TooLong { .. }
                | Self::InvalidCharset { .. }
                | Self::InvalidWindow { .. }
        )
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        Self::Snapshot(e.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        Self::Snapshot(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            DomainError::entry_not_found(42).to_string(),
            "Entry not found: 42"
        );
        assert_eq!(
            DomainError::code_not_found("abc").to_string(),
            "Short code not found: abc"
        );
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(
            DomainError::DuplicateShortCode {
                code: "x".to_string()
            }
            .kind(),
            "duplicate_short_code"
        );
        assert_eq!(
            DomainError::GenerationExhausted { attempts: 10 }.kind(),
            "generation_exhausted"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(DomainError::TooShort { length: 2, min: 3 }.is_validation());
        assert!(
            DomainError::InvalidTtl {
                ttl_minutes: 0,
                max: 43_200
            }
            .is_validation()
        );
        assert!(!DomainError::Expired {
            code: "abc".to_string()
        }
        .is_validation());
    }

    #[test]
    fn test_charset_message_names_offending_char() {
        let err = DomainError::InvalidCharset {
            code: "bad code".to_string(),
            invalid: ' ',
        };
        assert!(err.to_string().contains("' '"));
    }
}
