//! Adapter-configuration error types
//!
//! These are setup-time failures: a domain or override referencing an
//! adapter that does not exist, or an override carrying an invalid error
//! pattern. They surface immediately when the registry is built and are
//! never retried.

use thiserror::Error;

/// Adapter registry configuration errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A domain binding or override references an adapter name that does
    /// not exist in the adapter table
    #[error("Unknown adapter '{name}' referenced by {referenced_by}")]
    UnknownAdapter {
        name: String,
        referenced_by: String,
    },

    /// A configured error pattern is not a valid regex
    #[error("Invalid error pattern '{pattern}' for adapter '{adapter}': {source}")]
    InvalidPattern {
        adapter: String,
        pattern: String,
        source: regex::Error,
    },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
