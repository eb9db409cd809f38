//! Backend command composition and execution
//!
//! The command runner turns an adapter plus a query into a literal shell
//! command line and executes it, either blocking (`run_sync`) or through
//! the bounded-concurrency job scheduler (`run_async`). Both paths are
//! cache-checked first, classify failures the same way, and write the
//! cache on non-empty success. The cache-hit async path never touches the
//! scheduler: the result is posted straight onto the completion channel.

use std::sync::Arc;

use tracing::trace;

use crate::backend::{BackendAdapter, EnvValue};
use crate::cache::{CacheKey, DocCache};

pub mod error;
pub mod scheduler;
pub mod spawn;

pub use error::{BackendFailure, RunnerError};
pub use scheduler::{Completion, JobScheduler, Lines, LookupRequest};
pub use spawn::{ProcessOutput, ProcessSpawner, ShellSpawner, SpawnOutcome};

/// Builds and executes backend commands
pub struct CommandRunner {
    spawner: Arc<dyn ProcessSpawner>,
    scheduler: JobScheduler,
    cache: DocCache,
}

impl CommandRunner {
    /// Create a runner and the completion channel its async path feeds
    #[must_use]
    pub fn new(
        max_async_jobs: usize,
        spawner: Arc<dyn ProcessSpawner>,
        cache: DocCache,
        runtime: tokio::runtime::Handle,
    ) -> (Self, tokio::sync::mpsc::UnboundedReceiver<Completion>) {
        let (scheduler, events) =
            JobScheduler::new(max_async_jobs, Arc::clone(&spawner), cache.clone(), runtime);
        (
            Self {
                spawner,
                scheduler,
                cache,
            },
            events,
        )
    }

    /// The shared rendered-output cache
    #[must_use]
    pub fn cache(&self) -> &DocCache {
        &self.cache
    }

    /// The job scheduler backing the asynchronous path
    #[must_use]
    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    /// Compose the literal shell invocation for a lookup
    ///
    /// Environment assignments come first (width placeholders resolved to
    /// the numeric `width`), then the command, the argument template, and
    /// the shell-quoted query. When a disambiguation `selection` is given
    /// and the adapter supports selections, the numeric answer is piped in
    /// so the backend reads it as if a human typed it. Stderr is merged
    /// into stdout.
    #[must_use]
    pub fn build_command(
        adapter: &BackendAdapter,
        query: &str,
        selection: Option<u32>,
        width: u16,
    ) -> String {
        let width_str = width.to_string();
        let mut parts: Vec<String> = Vec::new();
        for (key, value) in &adapter.env {
            let resolved = match value {
                EnvValue::Width => width_str.clone(),
                EnvValue::Literal(v) => shell_quote(v),
            };
            parts.push(format!("{key}={resolved}"));
        }
        parts.push(adapter.command.clone());
        for arg in &adapter.args {
            parts.push(shell_quote(&arg.replace("{width}", &width_str)));
        }
        parts.push(shell_quote(query));
        let invocation = parts.join(" ");

        let piped = match selection {
            Some(n) if adapter.supports_selections => format!("echo {n} | {invocation}"),
            _ => invocation,
        };
        format!("{piped} 2>&1")
    }

    /// Blocking lookup
    ///
    /// Checks the cache first; on a miss, runs the command as a blocking
    /// subprocess. Used when asynchronous execution is disabled and for
    /// existence probes.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Backend` for classified backend failures and
    /// `RunnerError::Spawn` when the process could not start.
    pub fn run_sync(
        &self,
        adapter: &Arc<BackendAdapter>,
        query: &str,
        selection: Option<u32>,
        width: u16,
    ) -> Result<Lines, RunnerError> {
        let key = CacheKey::new(query, selection, width);
        if let Some(lines) = self.cache.get(&key) {
            trace!(?key, "sync lookup served from cache");
            return Ok(lines);
        }
        let command = Self::build_command(adapter, query, selection, width);
        let output = self
            .spawner
            .run_blocking(&command)
            .map_err(|e| RunnerError::spawn(&e))?;
        process_output(&self.cache, adapter, &key, &command, &output)
    }

    /// Non-blocking lookup, delivered through the completion channel
    ///
    /// A cache hit bypasses process spawning entirely and completes on the
    /// caller's event loop; a miss is submitted to the scheduler and runs
    /// (or queues) under the concurrency ceiling.
    pub fn run_async(
        &self,
        adapter: &Arc<BackendAdapter>,
        query: &str,
        selection: Option<u32>,
        width: u16,
    ) {
        let key = CacheKey::new(query, selection, width);
        if let Some(lines) = self.cache.get(&key) {
            trace!(?key, "async lookup served from cache");
            self.scheduler.post_ready(key, lines);
            return;
        }
        let command = Self::build_command(adapter, query, selection, width);
        self.scheduler.submit(LookupRequest {
            adapter: Arc::clone(adapter),
            key,
            command,
        });
    }
}

/// Classify a finished process and turn its output into cached lines
///
/// Shared by the blocking path and the scheduler's exit path. Failure is
/// signalled by exit code when the adapter says so, otherwise by scanning
/// for the adapter's error patterns. Non-empty success output is cached;
/// empty output yields an uncached sentinel line set.
pub(crate) fn process_output(
    cache: &DocCache,
    adapter: &BackendAdapter,
    key: &CacheKey,
    command: &str,
    output: &ProcessOutput,
) -> Result<Lines, RunnerError> {
    if adapter.exit_code_error && output.exit_code != 0 {
        return Err(BackendFailure::ExitCode {
            exit_code: output.exit_code,
            command: command.to_string(),
        }
        .into());
    }
    if let Some(pattern) = adapter.matches_error_pattern(&output.text) {
        return Err(BackendFailure::Pattern {
            pattern: pattern.to_string(),
            command: command.to_string(),
        }
        .into());
    }

    let lines = (adapter.postprocess)(&output.text);
    if lines.is_empty() {
        return Ok(Arc::new(vec![format!(
            "{} produced no output for '{}'",
            adapter.name, key.query
        )]));
    }
    let lines = Arc::new(lines);
    cache.insert(key.clone(), Arc::clone(&lines));
    Ok(lines)
}

/// Quote a string for inclusion in an `sh -c` command line
fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%_-+=:,./".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
