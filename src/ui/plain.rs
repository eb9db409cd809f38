//! Plain CLI frontend
//!
//! One-shot lookups that print to stdout: the renderer writes lines
//! directly, disambiguation is answered through a `dialoguer` prompt, and
//! notifications go to stderr with severity coloring. This mode uses the
//! engine's blocking path; the pager frontend is the asynchronous one.

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use super::traits::{HoverFallback, Notifier, Renderer, Severity, SizeClass, ViewRequest};
use crate::DocrError;
use crate::engine::{Engine, ViewKind};

/// Renderer that prints lines to stdout
#[derive(Debug, Default)]
pub struct PlainRenderer {
    quiet: bool,
}

impl PlainRenderer {
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Renderer for PlainRenderer {
    fn display(&mut self, lines: &[String], view: &ViewRequest) {
        if !self.quiet && view.size == SizeClass::Large {
            println!("{}", format!("=== {} ===", view.title).bold());
        }
        for line in lines {
            println!("{line}");
        }
    }

    fn close(&mut self) {
        // Nothing to tear down: output already went to stdout.
    }
}

/// Notifier printing severity-tagged single lines to stderr
#[derive(Debug, Default)]
pub struct PlainNotifier {
    quiet: bool,
}

impl PlainNotifier {
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Notifier for PlainNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => {
                if !self.quiet {
                    eprintln!("{message}");
                }
            }
            Severity::Warn => eprintln!("{}", message.yellow()),
            Severity::Error => eprintln!("{}", message.red()),
        }
    }
}

/// Hover fallback for a standalone terminal: there is no host editor, so
/// the request degrades to a hint
#[derive(Debug, Default)]
pub struct PlainHover;

impl HoverFallback for PlainHover {
    fn trigger(&self) {
        eprintln!("{}", "No entry found; no hover service available here".dimmed());
    }
}

/// Run one lookup to completion in plain mode
///
/// The engine renders directly through [`PlainRenderer`]; if the query
/// disambiguates, the user is asked for the option number the same way
/// the backend itself would ask.
///
/// # Errors
///
/// Returns `DocrError` for configuration failures or when the
/// disambiguation prompt cannot be read.
pub fn run_lookup(
    engine: &mut Engine,
    domain: &str,
    query: &str,
    width: u16,
) -> Result<(), DocrError> {
    engine.lookup(domain, query, width)?;

    if let ViewKind::Selection(options) = engine.view() {
        let max = options.iter().map(|o| o.num).max().unwrap_or(1);
        let selection: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Selection (1-{max})"))
            .interact_text()
            .map_err(|e| DocrError::InvalidInput(format!("could not read selection: {e}")))?;
        engine.select(selection);
    }
    Ok(())
}
