//! Bounded-concurrency job scheduler for asynchronous lookups
//!
//! Each submitted request is one job: `Queued -> Running -> Completed`
//! (failure is a terminal variant of completion carrying the error). At
//! most `max_async_jobs` jobs run concurrently; excess requests wait in
//! FIFO order and the queue drains as running jobs exit.
//!
//! Completions are never delivered from the process-exit path directly:
//! they are posted onto a channel whose single consumer is the navigation
//! engine's event pump, so all shared-state mutation stays on the caller's
//! loop.
//!
//! `cleanup()` is the sole cancellation primitive and is coarse-grained:
//! it kills every running job, discards the queue, and bumps a generation
//! counter so that in-flight exit paths deliver nothing stale.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::error::RunnerError;
use super::process_output;
use super::spawn::{ProcessSpawner, SpawnOutcome};
use crate::backend::BackendAdapter;
use crate::cache::{CacheKey, DocCache};

/// Rendered documentation lines, shared between cache and consumers
pub type Lines = Arc<Vec<String>>;

/// One asynchronous lookup request
pub struct LookupRequest {
    /// Adapter the command was built for
    pub adapter: Arc<BackendAdapter>,
    /// Cache key the result will be stored under
    pub key: CacheKey,
    /// Fully composed shell command line
    pub command: String,
}

/// Completion of one asynchronous lookup, consumed by the engine pump
#[derive(Debug, Clone)]
pub struct Completion {
    /// Scheduler generation the request was submitted under
    pub generation: u64,
    /// Key identifying the request
    pub key: CacheKey,
    /// Rendered lines, or the terminal error for this request
    pub result: Result<Lines, RunnerError>,
}

struct RunningJob {
    cancel: CancellationToken,
}

struct SchedulerState {
    running: HashMap<u64, RunningJob>,
    queued: VecDeque<LookupRequest>,
    generation: u64,
    next_job_id: u64,
}

/// Bounded-concurrency manager for asynchronous backend invocations
///
/// Cheap to clone; clones share the same state, which is guarded by a
/// mutex held only for bookkeeping (never across a process wait).
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Mutex<SchedulerState>>,
    spawner: Arc<dyn ProcessSpawner>,
    cache: DocCache,
    events: mpsc::UnboundedSender<Completion>,
    runtime: Handle,
    max_jobs: usize,
}

impl JobScheduler {
    /// Create a scheduler and the completion channel it delivers into
    #[must_use]
    pub fn new(
        max_jobs: usize,
        spawner: Arc<dyn ProcessSpawner>,
        cache: DocCache,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            inner: Arc::new(Mutex::new(SchedulerState {
                running: HashMap::new(),
                queued: VecDeque::new(),
                generation: 0,
                next_job_id: 0,
            })),
            spawner,
            cache,
            events,
            runtime,
            max_jobs: max_jobs.max(1),
        };
        (scheduler, receiver)
    }

    /// Submit a request: start it if a slot is free, otherwise queue it
    pub fn submit(&self, request: LookupRequest) {
        let mut state = self.lock();
        if state.running.len() < self.max_jobs {
            self.start_locked(&mut state, request);
        } else {
            trace!(key = ?request.key, "queueing lookup, concurrency ceiling reached");
            state.queued.push_back(request);
        }
    }

    /// Deliver an already-available result through the completion channel
    ///
    /// Used for cache hits so they complete on the caller's event loop
    /// without blocking it or occupying a job slot.
    pub fn post_ready(&self, key: CacheKey, lines: Lines) {
        let generation = self.lock().generation;
        let _ = self.events.send(Completion {
            generation,
            key,
            result: Ok(lines),
        });
    }

    /// Cancel all running jobs and discard the queue
    ///
    /// Best-effort: jobs already exiting are skipped. Discarded queued
    /// requests never deliver a completion. A no-op when nothing is
    /// running and the queue is empty.
    pub fn cleanup(&self) {
        let mut state = self.lock();
        if state.running.is_empty() && state.queued.is_empty() {
            return;
        }
        debug!(
            running = state.running.len(),
            queued = state.queued.len(),
            "cancelling in-flight lookups"
        );
        for job in state.running.values() {
            job.cancel.cancel();
        }
        state.queued.clear();
        state.generation += 1;
    }

    /// Generation stamped onto newly submitted requests
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Number of currently running jobs
    #[must_use]
    pub fn running_len(&self) -> usize {
        self.lock().running.len()
    }

    /// Number of queued requests
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.lock().queued.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.inner.lock().expect("scheduler state poisoned")
    }

    fn start_locked(&self, state: &mut SchedulerState, request: LookupRequest) {
        let id = state.next_job_id;
        state.next_job_id += 1;
        let cancel = CancellationToken::new();
        state.running.insert(
            id,
            RunningJob {
                cancel: cancel.clone(),
            },
        );
        let generation = state.generation;
        trace!(id, key = ?request.key, "starting lookup job");

        let scheduler = self.clone();
        self.runtime.spawn(async move {
            scheduler.run_job(id, generation, request, cancel).await;
        });
    }

    async fn run_job(
        &self,
        id: u64,
        generation: u64,
        request: LookupRequest,
        cancel: CancellationToken,
    ) {
        let outcome = self.spawner.run(&request.command, cancel).await;

        // Exit bookkeeping: free the slot and promote the oldest queued
        // request before the result is delivered to the requester.
        let (stale, next) = {
            let mut state = self.lock();
            state.running.remove(&id);
            let stale = state.generation != generation;
            let next = if stale { None } else { state.queued.pop_front() };
            (stale, next)
        };
        if let Some(next_request) = next {
            self.submit(next_request);
        }
        if stale {
            trace!(id, "discarding result of superseded job");
            return;
        }

        let result = match outcome {
            Ok(SpawnOutcome::Completed(output)) => process_output(
                &self.cache,
                &request.adapter,
                &request.key,
                &request.command,
                &output,
            ),
            Ok(SpawnOutcome::Cancelled) => return,
            Err(err) => Err(RunnerError::spawn(&err)),
        };
        debug!(id, key = ?request.key, ok = result.is_ok(), "lookup job finished");
        let _ = self.events.send(Completion {
            generation,
            key: request.key,
            result,
        });
    }
}
