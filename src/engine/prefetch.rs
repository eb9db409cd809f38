//! Speculative cache warming for disambiguation lists
//!
//! While the user looks at a pick-list, the engine fetches the most likely
//! follow-up selections in the background so the eventual choice resolves
//! from cache. Options are taken strictly in list order (lowest number
//! first); prefetch jobs share the scheduler's bounded capacity with
//! interactive requests, so heavy prefetching can delay a concurrently
//! issued selection. That trade-off is accepted: there is no separate
//! low-priority lane.

use std::sync::Arc;

use tracing::debug;

use crate::backend::BackendAdapter;
use crate::options::OptionEntry;
use crate::runner::CommandRunner;

/// Issues background fetches for the top options of a disambiguation list
#[derive(Debug, Clone, Copy)]
pub struct Prefetcher {
    /// Upper bound on options fetched per list
    pub limit: usize,
    /// Disabled entirely when asynchronous execution is off
    pub enabled: bool,
}

impl Prefetcher {
    #[must_use]
    pub const fn new(limit: usize, enabled: bool) -> Self {
        Self { limit, enabled }
    }

    /// Warm the cache for the first `limit` options
    ///
    /// Already-cached options complete immediately through the completion
    /// channel without spawning; the rest go through `run_async` and
    /// report readiness as their processes finish. Returns the number of
    /// options issued.
    pub fn run(
        &self,
        runner: &CommandRunner,
        adapter: &Arc<BackendAdapter>,
        query: &str,
        options: &[OptionEntry],
        width: u16,
    ) -> usize {
        if !self.enabled {
            return 0;
        }
        let take = self.limit.min(options.len());
        for option in &options[..take] {
            runner.run_async(adapter, query, Some(option.num), width);
        }
        if take > 0 {
            debug!(query, count = take, "prefetching disambiguation options");
        }
        take
    }
}
