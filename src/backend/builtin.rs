//! Built-in backend adapter table
//!
//! Covers the common documentation tools out of the box. User configuration
//! can re-bind domains to these adapters and override their arguments, but
//! the post-processing and option-parsing functions always come from this
//! table.

use regex::Regex;

use super::{BackendAdapter, EnvValue};
use crate::options;

/// All built-in adapters
///
/// # Panics
///
/// Does not panic: the embedded patterns are compile-time constants and
/// known to be valid regexes (covered by tests).
#[must_use]
pub fn builtin_adapters() -> Vec<BackendAdapter> {
    vec![man(), cppman(), pydoc()]
}

/// `man` - system manual pages
///
/// Renders at the current display width via `MANWIDTH`. A missing page
/// reports "No manual entry for ..." and exits non-zero; failures fall back
/// to the host's hover service when one is wired up.
fn man() -> BackendAdapter {
    BackendAdapter::new("man", "man")
        .with_env("MANWIDTH", EnvValue::Width)
        .with_env("MANPAGER", EnvValue::Literal("cat".into()))
        .with_error_patterns(vec![
            Regex::new(r"No manual entry for").unwrap(),
            Regex::new(r"nothing appropriate").unwrap(),
        ])
        .with_exit_code_error(true)
        .with_hover_fallback(true)
}

/// `cppman` - C++ standard library references
///
/// A query like "sort" matches several pages; cppman prompts for a numbered
/// selection, which the runner answers by piping the number in. The echoed
/// prompt is stripped from the rendered output. cppman reports lookup
/// failures on stdout rather than through its exit code.
fn cppman() -> BackendAdapter {
    BackendAdapter::new("cppman", "cppman")
        .with_args(vec!["--force-columns".into(), "{width}".into()])
        .with_env("COLUMNS", EnvValue::Width)
        .with_error_patterns(vec![Regex::new(r"(?m)^error:").unwrap()])
        .with_exit_code_error(false)
        .with_selections(options::parse_numbered_options)
        .with_postprocess(cppman_postprocess)
}

/// `pydoc` - Python documentation
fn pydoc() -> BackendAdapter {
    BackendAdapter::new("pydoc", "pydoc3")
        .with_error_patterns(vec![
            Regex::new(r"No Python documentation found").unwrap(),
        ])
        .with_exit_code_error(true)
}

/// Default post-processor: split into lines, strip carriage returns and
/// trailing blank lines
#[must_use]
pub fn default_postprocess(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = raw
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// cppman post-processor: default processing plus removal of the echoed
/// interactive selection prompt
fn cppman_postprocess(raw: &str) -> Vec<String> {
    default_postprocess(raw)
        .into_iter()
        .filter(|l| !l.contains("enter selection") && !l.contains("Select a manual"))
        .collect()
}
