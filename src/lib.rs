//! docr - A documentation lookup and navigation engine
//!
//! This library resolves a search term to external documentation-tool
//! invocations (man, cppman, pydoc, ...), handles numbered disambiguation,
//! caches rendered output for the lifetime of the process, prefetches
//! likely follow-up selections, and provides back/forward navigation over
//! visited entries.

use thiserror::Error;

pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod options;
pub mod runner;
pub mod ui;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum DocrError {
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Adapter table or domain binding error
    #[error("Adapter error: {0}")]
    AdapterError(#[from] backend::RegistryError),
    /// Backend command failed to run or reported failure
    #[error("Lookup error: {0}")]
    LookupError(#[from] runner::RunnerError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
