//! Documentation backend adapters
//!
//! A backend adapter describes how to invoke and interpret one external
//! documentation tool: the command and argument template, environment
//! assignments, how to recognize failure output, and which capabilities the
//! tool has (numbered disambiguation, hover fallback).
//!
//! Adapters are plain data records plus two pure functions (output
//! post-processing and option-list parsing). New backends are added by
//! inserting a record into the built-in table or the user configuration;
//! the engine never branches on backend identity.

use regex::Regex;

use crate::options::OptionEntry;

pub mod builtin;
pub mod error;
pub mod registry;

pub use builtin::builtin_adapters;
pub use error::RegistryError;
pub use registry::AdapterRegistry;

/// Pure post-processing function: raw captured output to display lines
///
/// Strips backend-specific noise, e.g. the selection prompt an interactive
/// tool echoes when its answer is piped in.
pub type PostprocessFn = fn(&str) -> Vec<String>;

/// Pure option-list parser: raw captured output to disambiguation options
pub type OptionParseFn = fn(&str) -> Vec<OptionEntry>;

/// Value of one environment assignment in an adapter's invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// A fixed string
    Literal(String),
    /// Resolved to the current display width at invocation time
    Width,
}

/// Immutable description of one external documentation backend
///
/// Constructed once at startup from the built-in table plus user overrides,
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct BackendAdapter {
    /// Identifying name (also the key for configuration overrides)
    pub name: String,
    /// Executable to invoke
    pub command: String,
    /// Argument template, appended before the query
    pub args: Vec<String>,
    /// Environment assignments prepended to the command line
    pub env: Vec<(String, EnvValue)>,
    /// Output patterns that indicate a failed lookup
    pub error_patterns: Vec<Regex>,
    /// Whether a non-zero exit code alone signals failure
    pub exit_code_error: bool,
    /// Whether a failed lookup should fall back to the host's hover service
    pub fallback_to_hover: bool,
    /// Whether the backend supports numbered disambiguation
    pub supports_selections: bool,
    /// Raw output to display lines
    pub postprocess: PostprocessFn,
    /// Option-list parser, for backends with `supports_selections`
    pub option_parser: Option<OptionParseFn>,
}

impl BackendAdapter {
    /// Create an adapter with default flags and the default post-processor
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            error_patterns: Vec::new(),
            exit_code_error: true,
            fallback_to_hover: false,
            supports_selections: false,
            postprocess: builtin::default_postprocess,
            option_parser: None,
        }
    }

    /// Set the argument template
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Add an environment assignment
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: EnvValue) -> Self {
        self.env.push((key.into(), value));
        self
    }

    /// Set the error-indicating output patterns
    #[must_use]
    pub fn with_error_patterns(mut self, patterns: Vec<Regex>) -> Self {
        self.error_patterns = patterns;
        self
    }

    /// Set whether a non-zero exit code alone signals failure
    #[must_use]
    pub const fn with_exit_code_error(mut self, flag: bool) -> Self {
        self.exit_code_error = flag;
        self
    }

    /// Set whether failed lookups fall back to the hover service
    #[must_use]
    pub const fn with_hover_fallback(mut self, flag: bool) -> Self {
        self.fallback_to_hover = flag;
        self
    }

    /// Enable numbered disambiguation with the given option parser
    #[must_use]
    pub fn with_selections(mut self, parser: OptionParseFn) -> Self {
        self.supports_selections = true;
        self.option_parser = Some(parser);
        self
    }

    /// Set the output post-processor
    #[must_use]
    pub fn with_postprocess(mut self, postprocess: PostprocessFn) -> Self {
        self.postprocess = postprocess;
        self
    }

    /// Whether any error pattern matches the given output
    #[must_use]
    pub fn matches_error_pattern(&self, output: &str) -> Option<&Regex> {
        self.error_patterns.iter().find(|p| p.is_match(output))
    }
}
