//! Lookup-and-navigation engine
//!
//! Orchestrates a lookup session: resolve the adapter for a domain, decide
//! between content, disambiguation, and not-found outcomes, warm the cache
//! for likely follow-ups, and maintain back/forward navigation state.
//!
//! All engine state is mutated on the caller's thread. Asynchronous
//! lookups complete through a channel whose single consumer is
//! [`Engine::pump`]; the scheduler's background tasks never touch
//! navigation state themselves, so no two completions ever interleave
//! mid-mutation.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, trace};

use crate::DocrError;
use crate::backend::{AdapterRegistry, BackendAdapter};
use crate::cache::CacheKey;
use crate::options::{self, OptionEntry, ParseOutcome};
use crate::runner::{CommandRunner, Completion, Lines, RunnerError};
use crate::ui::{HoverFallback, Notifier, Renderer, Severity, ViewRequest};

pub mod history;
pub mod prefetch;

pub use history::{HistoryEntry, HistoryMode, HistoryStack, ViewClass};
pub use prefetch::Prefetcher;

/// Engine behavior knobs, bound once at startup
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub history_mode: HistoryMode,
    pub auto_select_first_match: bool,
    pub async_enabled: bool,
    pub max_prefetch_options: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_mode: HistoryMode::default(),
            auto_select_first_match: false,
            async_enabled: true,
            max_prefetch_options: 5,
        }
    }
}

/// What the user is currently looking at
#[derive(Debug, Clone, Default)]
pub enum ViewKind {
    /// Nothing displayed
    #[default]
    None,
    /// A disambiguation pick-list
    Selection(Vec<OptionEntry>),
    /// Rendered page content
    Content,
}

/// How a display should interact with history once it lands
enum Disposition {
    /// Normal navigation: record the prior view per the history mode
    Record {
        prior: Option<(ViewClass, HistoryEntry)>,
    },
    /// Back/forward traversal: the stacks were already adjusted
    Traverse,
}

/// A user-facing fetch whose completion will drive the display
struct PendingDisplay {
    key: CacheKey,
    disposition: Disposition,
}

/// Mutable per-session navigation state
///
/// Reset at the start of each fresh top-level lookup. The adapter is bound
/// once per session so back/forward traversal never re-resolves the
/// domain mapping mid-session.
#[derive(Default)]
struct NavigationState {
    page: Option<String>,
    selection: Option<u32>,
    adapter: Option<Arc<BackendAdapter>>,
    width: u16,
    view: ViewKind,
    pending: Option<PendingDisplay>,
    ready: HashSet<u32>,
}

/// The lookup-and-navigation engine
///
/// Owns the adapter registry, the command runner (and through it the
/// cache and job scheduler), the history stacks, and the frontend
/// collaborators.
pub struct Engine {
    registry: AdapterRegistry,
    runner: CommandRunner,
    events: mpsc::UnboundedReceiver<Completion>,
    history: HistoryStack,
    prefetcher: Prefetcher,
    nav: NavigationState,
    options: EngineOptions,
    renderer: Box<dyn Renderer>,
    notifier: Box<dyn Notifier>,
    hover: Box<dyn HoverFallback>,
}

impl Engine {
    /// Assemble an engine from its parts
    #[must_use]
    pub fn new(
        registry: AdapterRegistry,
        runner: CommandRunner,
        events: mpsc::UnboundedReceiver<Completion>,
        options: EngineOptions,
        renderer: Box<dyn Renderer>,
        notifier: Box<dyn Notifier>,
        hover: Box<dyn HoverFallback>,
    ) -> Self {
        let prefetcher = Prefetcher::new(options.max_prefetch_options, options.async_enabled);
        let history = HistoryStack::new(options.history_mode);
        Self {
            registry,
            runner,
            events,
            history,
            prefetcher,
            nav: NavigationState::default(),
            options,
            renderer,
            notifier,
            hover,
        }
    }

    /// Start a fresh top-level lookup
    ///
    /// Cancels everything in flight, clears both history stacks, resets
    /// navigation state, and binds the session adapter for `domain`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `domain` references an unknown
    /// adapter. Backend and spawn failures are recovered locally into
    /// notifications and do not error.
    pub fn lookup(&mut self, domain: &str, query: &str, width: u16) -> Result<(), DocrError> {
        self.runner.scheduler().cleanup();
        self.history.clear();
        self.nav = NavigationState {
            width,
            ..NavigationState::default()
        };
        let adapter = self.registry.resolve(domain)?;
        debug!(domain, query, adapter = %adapter.name, "fresh lookup");
        self.nav.adapter = Some(adapter);
        self.begin_query(query.to_string(), Disposition::Record { prior: None });
        Ok(())
    }

    /// Follow a cross-reference from within displayed content
    ///
    /// Fresh-lookup semantics for the cache and scheduler, but the current
    /// view joins history per the configured mode instead of the stacks
    /// being cleared.
    pub fn follow(&mut self, word: &str) {
        if self.nav.adapter.is_none() {
            self.notifier
                .notify(Severity::Info, "No lookup session is active");
            return;
        }
        self.runner.scheduler().cleanup();
        self.nav.pending = None;
        let prior = self.current_prior();
        debug!(word, "following reference");
        self.begin_query(word.to_string(), Disposition::Record { prior });
    }

    /// The user chose option `num` from the displayed disambiguation list
    pub fn select(&mut self, num: u32) {
        let ViewKind::Selection(options_list) = &self.nav.view else {
            self.notifier
                .notify(Severity::Info, "No selection list is open");
            return;
        };
        if !options_list.iter().any(|o| o.num == num) {
            self.notifier
                .notify(Severity::Warn, &format!("No option {num} in the list"));
            return;
        }
        let Some(page) = self.nav.page.clone() else {
            return;
        };
        let prior = self.current_prior();
        self.fetch_content(page, Some(num), Disposition::Record { prior });
    }

    /// Navigate to the previous entry
    pub fn go_back(&mut self) {
        let Some(entry) = self.history.pop_back() else {
            self.notifier.notify(Severity::Info, "No previous page");
            return;
        };
        if let Some(current) = self.current_entry() {
            self.history.push_forward(current);
        }
        self.traverse_to(entry);
    }

    /// Retrace an undone back-navigation
    pub fn go_forward(&mut self) {
        let Some(entry) = self.history.pop_forward() else {
            self.notifier.notify(Severity::Info, "No next page");
            return;
        };
        if let Some(current) = self.current_entry() {
            self.history.push_back(current);
        }
        self.traverse_to(entry);
    }

    /// Close the active display and cancel in-flight work
    pub fn close(&mut self) {
        self.renderer.close();
        self.runner.scheduler().cleanup();
        self.nav.pending = None;
        self.nav.page = None;
        self.nav.selection = None;
        self.nav.view = ViewKind::None;
    }

    /// Drain completed asynchronous lookups and apply them
    ///
    /// The single consumer of the completion channel. Returns the number
    /// of completions applied; completions from a superseded scheduler
    /// generation are dropped unseen.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(completion) => {
                    if self.on_completion(completion) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Current page identifier, if a view is open
    #[must_use]
    pub fn current_page(&self) -> Option<&str> {
        self.nav.page.as_deref()
    }

    /// Current disambiguation selection, if any
    #[must_use]
    pub fn current_selection(&self) -> Option<u32> {
        self.nav.selection
    }

    /// What is currently displayed
    #[must_use]
    pub fn view(&self) -> &ViewKind {
        &self.nav.view
    }

    /// Options of the displayed pick-list whose content is already cached
    #[must_use]
    pub fn ready_selections(&self) -> &HashSet<u32> {
        &self.nav.ready
    }

    /// Whether a user-facing fetch is still in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.nav.pending.is_some()
    }

    /// The history stacks (read-only)
    #[must_use]
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// The command runner, cache, and scheduler backing this engine
    #[must_use]
    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    fn begin_query(&mut self, query: String, disposition: Disposition) {
        let Some(adapter) = self.nav.adapter.clone() else {
            return;
        };
        match options::parse(&self.runner, &adapter, &query, self.nav.width) {
            Err(err) => self.report_error(&err),
            Ok(ParseOutcome::NotFound) => {
                self.runner.scheduler().cleanup();
                self.nav.pending = None;
                if adapter.fallback_to_hover {
                    debug!(query, "not found, deferring to hover fallback");
                    self.hover.trigger();
                } else {
                    self.notifier.notify(
                        Severity::Warn,
                        &format!("No documentation found for '{query}'"),
                    );
                }
            }
            Ok(ParseOutcome::Options(options_list)) if options_list.is_empty() => {
                self.fetch_content(query, None, disposition);
            }
            Ok(ParseOutcome::Options(options_list)) => {
                if self.options.auto_select_first_match {
                    let first = options_list[0].num;
                    debug!(query, first, "auto-selecting first match");
                    self.fetch_content(query, Some(first), disposition);
                } else {
                    self.show_selection(query, options_list, disposition);
                }
            }
        }
    }

    fn show_selection(
        &mut self,
        query: String,
        options_list: Vec<OptionEntry>,
        disposition: Disposition,
    ) {
        self.apply_history(&disposition, ViewClass::Selection);
        let lines = selection_lines(&query, &options_list);
        self.renderer
            .display(&lines, &ViewRequest::selection(query.clone()));
        self.nav.page = Some(query.clone());
        self.nav.selection = None;
        self.nav.ready = HashSet::new();
        if let Some(adapter) = self.nav.adapter.clone() {
            self.prefetcher.run(
                &self.runner,
                &adapter,
                &query,
                &options_list,
                self.nav.width,
            );
        }
        self.nav.view = ViewKind::Selection(options_list);
    }

    fn fetch_content(&mut self, query: String, selection: Option<u32>, disposition: Disposition) {
        let Some(adapter) = self.nav.adapter.clone() else {
            return;
        };
        let key = CacheKey::new(query.clone(), selection, self.nav.width);
        if self.options.async_enabled {
            self.nav.pending = Some(PendingDisplay {
                key: key.clone(),
                disposition,
            });
            self.runner
                .run_async(&adapter, &query, selection, self.nav.width);
        } else {
            match self.runner.run_sync(&adapter, &query, selection, self.nav.width) {
                Ok(lines) => self.display_content(key, &lines, disposition),
                Err(err) => self.report_error(&err),
            }
        }
    }

    fn display_content(&mut self, key: CacheKey, lines: &Lines, disposition: Disposition) {
        self.apply_history(&disposition, ViewClass::Content);
        self.renderer
            .display(lines, &ViewRequest::content(key.query.clone()));
        self.nav.page = Some(key.query);
        self.nav.selection = key.selection;
        self.nav.view = ViewKind::Content;
    }

    fn traverse_to(&mut self, entry: HistoryEntry) {
        match entry.selection {
            // The entry carries a selection: re-display that exact content.
            Some(selection) => {
                self.fetch_content(entry.page, Some(selection), Disposition::Traverse);
            }
            // The entry was a disambiguation-list view (or a bare page):
            // re-run the lookup, which resolves from cache.
            None => self.begin_query(entry.page, Disposition::Traverse),
        }
    }

    fn on_completion(&mut self, completion: Completion) -> bool {
        if completion.generation != self.runner.scheduler().generation() {
            trace!(key = ?completion.key, "dropping completion from superseded session");
            return false;
        }
        if self
            .nav
            .pending
            .as_ref()
            .is_some_and(|p| p.key == completion.key)
        {
            if let Some(pending) = self.nav.pending.take() {
                match completion.result {
                    Ok(lines) => self.display_content(pending.key, &lines, pending.disposition),
                    Err(err) => self.report_error(&err),
                }
            }
            return true;
        }

        // Everything else is a prefetch landing (or a duplicate of one).
        match completion.result {
            Ok(_) => {
                if let (Some(page), Some(selection)) =
                    (self.nav.page.as_ref(), completion.key.selection)
                    && *page == completion.key.query
                    && matches!(self.nav.view, ViewKind::Selection(_))
                {
                    trace!(selection, "prefetched option ready");
                    self.nav.ready.insert(selection);
                }
            }
            Err(err) => trace!(%err, "background lookup failed"),
        }
        true
    }

    fn apply_history(&mut self, disposition: &Disposition, target: ViewClass) {
        if let Disposition::Record { prior } = disposition {
            self.history.record(prior.clone(), target);
        }
    }

    fn current_prior(&self) -> Option<(ViewClass, HistoryEntry)> {
        let class = match self.nav.view {
            ViewKind::Selection(_) => ViewClass::Selection,
            ViewKind::Content => ViewClass::Content,
            ViewKind::None => return None,
        };
        self.current_entry().map(|entry| (class, entry))
    }

    fn current_entry(&self) -> Option<HistoryEntry> {
        self.nav
            .page
            .clone()
            .map(|page| HistoryEntry::new(page, self.nav.selection))
    }

    fn report_error(&mut self, err: &RunnerError) {
        self.notifier.notify(Severity::Error, &err.to_string());
    }
}

/// Render a disambiguation list as display lines
fn selection_lines(query: &str, options_list: &[OptionEntry]) -> Vec<String> {
    let mut lines = vec![format!("Multiple entries for '{query}':"), String::new()];
    lines.extend(
        options_list
            .iter()
            .map(|option| format!("  {}. {}", option.num, option.text)),
    );
    lines
}
