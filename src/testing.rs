//! Testing utilities for docr
//!
//! Provides a programmable process spawner so the runner, scheduler, and
//! engine can be exercised without touching real documentation tools, plus
//! canned adapters for the common capability combinations.
//!
//! Only available when compiled with `cfg(test)`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::backend::BackendAdapter;
use crate::options::parse_numbered_options;
use crate::runner::{ProcessOutput, ProcessSpawner, SpawnOutcome};

/// Process spawner returning canned output instead of running commands
///
/// Responses are matched by substring against the composed command line;
/// unmatched commands get a generic success. A gated spawner holds every
/// asynchronous run until the test releases permits, which makes
/// concurrency-ceiling and queue-draining behavior deterministic.
pub struct FakeSpawner {
    responses: Vec<(String, ProcessOutput)>,
    gate: Option<Arc<Semaphore>>,
    fail_spawn: bool,
    async_spawns: AtomicUsize,
    blocking_spawns: AtomicUsize,
    current: AtomicUsize,
    max_concurrency: AtomicUsize,
}

impl FakeSpawner {
    /// Spawner whose runs complete immediately
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            gate: None,
            fail_spawn: false,
            async_spawns: AtomicUsize::new(0),
            blocking_spawns: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            max_concurrency: AtomicUsize::new(0),
        }
    }

    /// Spawner whose asynchronous runs block until the returned gate
    /// receives permits (one permit releases one run)
    #[must_use]
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let spawner = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new()
        };
        (spawner, gate)
    }

    /// Add a canned response for command lines containing `needle`
    #[must_use]
    pub fn with_response(mut self, needle: &str, text: &str, exit_code: i32) -> Self {
        self.responses.push((
            needle.to_string(),
            ProcessOutput {
                text: text.to_string(),
                exit_code,
            },
        ));
        self
    }

    /// Make every spawn attempt fail as if the executable were missing
    #[must_use]
    pub fn with_spawn_failure(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    /// Number of asynchronous runs started
    #[must_use]
    pub fn async_spawns(&self) -> usize {
        self.async_spawns.load(Ordering::SeqCst)
    }

    /// Number of blocking runs started
    #[must_use]
    pub fn blocking_spawns(&self) -> usize {
        self.blocking_spawns.load(Ordering::SeqCst)
    }

    /// Highest number of asynchronous runs observed in flight at once
    #[must_use]
    pub fn max_observed_concurrency(&self) -> usize {
        self.max_concurrency.load(Ordering::SeqCst)
    }

    fn lookup(&self, command: &str) -> ProcessOutput {
        self.responses
            .iter()
            .find(|(needle, _)| command.contains(needle))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| ProcessOutput {
                text: format!("fake documentation for `{command}`\n"),
                exit_code: 0,
            })
    }
}

impl Default for FakeSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSpawner for FakeSpawner {
    async fn run(
        &self,
        command: &str,
        cancel: CancellationToken,
    ) -> std::io::Result<SpawnOutcome> {
        if self.fail_spawn {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "spawn refused by test",
            ));
        }
        self.async_spawns.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrency.fetch_max(in_flight, Ordering::SeqCst);

        let outcome = if let Some(gate) = &self.gate {
            tokio::select! {
                () = cancel.cancelled() => SpawnOutcome::Cancelled,
                permit = gate.acquire() => {
                    permit.expect("test gate closed").forget();
                    SpawnOutcome::Completed(self.lookup(command))
                }
            }
        } else if cancel.is_cancelled() {
            SpawnOutcome::Cancelled
        } else {
            SpawnOutcome::Completed(self.lookup(command))
        };

        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(outcome)
    }

    fn run_blocking(&self, command: &str) -> std::io::Result<ProcessOutput> {
        if self.fail_spawn {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "spawn refused by test",
            ));
        }
        self.blocking_spawns.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup(command))
    }
}

/// Adapter without disambiguation support: exit code signals failure
#[must_use]
pub fn plain_adapter(name: &str) -> BackendAdapter {
    BackendAdapter::new(name, name)
        .with_error_patterns(vec![Regex::new("No documentation for").unwrap()])
}

/// Adapter with numbered disambiguation, failures reported in output
#[must_use]
pub fn selection_adapter(name: &str) -> BackendAdapter {
    BackendAdapter::new(name, name)
        .with_exit_code_error(false)
        .with_error_patterns(vec![Regex::new("(?m)^error:").unwrap()])
        .with_selections(parse_numbered_options)
}
