//! Disambiguation-option parsing and lookup-outcome classification
//!
//! When a backend supports numbered disambiguation, a bare query may print
//! an ordered list of candidate entries ("1. std::sort ...") instead of
//! content. This module extracts that list and decides between the three
//! lookup outcomes: a disambiguation list, a direct single result (zero
//! options), and "no documentation found".
//!
//! For backends without disambiguation the outcome reduces to an existence
//! test, run once per query at a narrow probe width and cached as a
//! boolean.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::backend::BackendAdapter;
use crate::runner::{CommandRunner, RunnerError};

/// Width used for existence probes
///
/// Narrow on purpose: the probe output is only inspected, never displayed,
/// and the rendering width does not affect whether a page exists.
pub const EXISTENCE_PROBE_WIDTH: u16 = 40;

/// Marker scanned for when a disambiguation probe yields zero options
static GENERIC_ERROR_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\b(not found|no (manual )?entr(y|ies)|error:)").unwrap()
});

/// Numbered-option line: `<num>. <text>`
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s*(.+)$").unwrap());

/// One entry of a disambiguation list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    /// The number the backend expects as an answer
    pub num: u32,
    /// Full description text after the number
    pub text: String,
    /// First whitespace-delimited token of the text, usable as a
    /// navigable identifier
    pub value: String,
}

/// Result of classifying a query against an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The query exists. An empty list means no disambiguation is needed
    /// and the bare query renders directly.
    Options(Vec<OptionEntry>),
    /// No matching documentation
    NotFound,
}

/// Parse numbered disambiguation options out of raw backend output
///
/// Lines that do not match the `<num>. <text>` shape are ignored; options
/// keep the backend's order.
#[must_use]
pub fn parse_numbered_options(raw: &str) -> Vec<OptionEntry> {
    raw.lines()
        .filter_map(|line| {
            let caps = OPTION_LINE.captures(line)?;
            let num: u32 = caps[1].parse().ok()?;
            let text = caps[2].trim().to_string();
            let value = text.split_whitespace().next()?.to_string();
            Some(OptionEntry { num, text, value })
        })
        .collect()
}

/// Classify a query: disambiguation options, direct result, or not found
///
/// Runs at most one synchronous, cache-checked backend invocation. For
/// adapters without disambiguation support this is a narrow existence
/// probe whose boolean result is cached per query, so repeated probes are
/// free.
///
/// # Errors
///
/// Returns `RunnerError` if the probe process could not be started.
/// Backend-reported failures (error patterns, exit codes) classify as
/// [`ParseOutcome::NotFound`] instead of erroring.
pub fn parse(
    runner: &CommandRunner,
    adapter: &Arc<BackendAdapter>,
    query: &str,
    width: u16,
) -> Result<ParseOutcome, RunnerError> {
    if !adapter.supports_selections {
        return probe_existence(runner, adapter, query);
    }

    let lines = match runner.run_sync(adapter, query, None, width) {
        Ok(lines) => lines,
        Err(RunnerError::Backend(_)) => return Ok(ParseOutcome::NotFound),
        Err(err) => return Err(err),
    };

    let raw = lines.join("\n");
    let parser = adapter.option_parser.unwrap_or(parse_numbered_options);
    let options = parser(&raw);
    if !options.is_empty() {
        return Ok(ParseOutcome::Options(options));
    }
    if GENERIC_ERROR_MARKER.is_match(&raw) || adapter.matches_error_pattern(&raw).is_some() {
        return Ok(ParseOutcome::NotFound);
    }
    Ok(ParseOutcome::Options(Vec::new()))
}

/// Existence test for adapters without disambiguation support
fn probe_existence(
    runner: &CommandRunner,
    adapter: &Arc<BackendAdapter>,
    query: &str,
) -> Result<ParseOutcome, RunnerError> {
    if let Some(exists) = runner.cache().existence(query) {
        return Ok(if exists {
            ParseOutcome::Options(Vec::new())
        } else {
            ParseOutcome::NotFound
        });
    }

    match runner.run_sync(adapter, query, None, EXISTENCE_PROBE_WIDTH) {
        Ok(_) => {
            runner.cache().record_existence(query, true);
            Ok(ParseOutcome::Options(Vec::new()))
        }
        Err(RunnerError::Backend(_)) => {
            runner.cache().record_existence(query, false);
            Ok(ParseOutcome::NotFound)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod options_tests;
