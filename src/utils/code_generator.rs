//! Short code generation and validation.
//!
//! Generation is a pure random draw; uniqueness is enforced by the registry on
//! insert, and the bounded retry lives in
//! [`crate::application::services::LinkService`].

use crate::error::DomainError;
use rand::Rng;

/// Length of generated codes.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Minimum length of a custom code.
pub const MIN_CODE_LENGTH: usize = 3;

/// Maximum length of any short code.
pub const MAX_CODE_LENGTH: usize = 32;

/// Alphabet for generated codes.
const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate short codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform random codes drawn from `[a-zA-Z0-9]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        generate_code()
    }
}

/// Generates a random 6-character alphanumeric code.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    let mut rng = rand::rng();

    (0..GENERATED_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Returns true for characters allowed in short codes: `[A-Za-z0-9_-]`.
pub fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Validates a user-provided custom short code.
///
/// Does not check uniqueness.
///
/// # Rules
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens, underscores
///
/// # Errors
///
/// Returns [`DomainError::TooShort`], [`DomainError::TooLong`] or
/// [`DomainError::InvalidCharset`], checked in that order.
pub fn validate_custom_code(code: &str) -> Result<(), DomainError> {
    let length = code.chars().count();

    if length < MIN_CODE_LENGTH {
        return Err(DomainError::TooShort {
            length,
            min: MIN_CODE_LENGTH,
        });
    }

    if length > MAX_CODE_LENGTH {
        return Err(DomainError::TooLong {
            length,
            max: MAX_CODE_LENGTH,
        });
    }

    if let Some(invalid) = code.chars().find(|&c| !is_code_char(c)) {
        return Err(DomainError::InvalidCharset {
            code: code.to_string(),
            invalid,
        });
    }

    Ok(())
}
