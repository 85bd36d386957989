//! Utility functions for code generation, URL validation and click metadata.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Destination URL validation
//! - [`user_agent`] - Device, browser and OS classification
//! - [`referrer`] - Referrer source normalisation

pub mod code_generator;
pub mod referrer;
pub mod url_validator;
pub mod user_agent;
