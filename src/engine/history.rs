//! Back/forward navigation history
//!
//! Two LIFO stacks of visited-entry records. Which transitions get
//! recorded is a configuration policy:
//!
//! - **unified**: every transition out of an existing view is recorded,
//!   including moves between a disambiguation list and page content.
//! - **separate**: only moves from one content view to another are
//!   recorded; entering or leaving a disambiguation list is invisible to
//!   history.
//!
//! Forward history is only valid for retracing an undone back-navigation:
//! any brand-new navigation clears it, in both modes.

use serde::{Deserialize, Serialize};

/// History recording policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    #[default]
    Unified,
    Separate,
}

/// Classification of a view for the recording policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewClass {
    /// Disambiguation pick-list
    Selection,
    /// Rendered page content
    Content,
}

/// One visited location
///
/// An entry without a selection index was a disambiguation-list view (or a
/// bare single-result page); traversing back to it re-runs the lookup.
/// An entry with one re-fetches that exact content directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub page: String,
    pub selection: Option<u32>,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(page: impl Into<String>, selection: Option<u32>) -> Self {
        Self {
            page: page.into(),
            selection,
        }
    }
}

/// The back/forward stack pair
#[derive(Debug, Default)]
pub struct HistoryStack {
    mode: HistoryMode,
    back: Vec<HistoryEntry>,
    forward: Vec<HistoryEntry>,
}

impl HistoryStack {
    #[must_use]
    pub fn new(mode: HistoryMode) -> Self {
        Self {
            mode,
            back: Vec::new(),
            forward: Vec::new(),
        }
    }

    /// Drop both stacks; called when a fresh top-level lookup starts
    pub fn clear(&mut self) {
        self.back.clear();
        self.forward.clear();
    }

    /// Record a non-traversal navigation away from `prior` into a view of
    /// class `target`
    ///
    /// Clears forward history unconditionally (the new page invalidates
    /// any retrace) and pushes `prior` onto `back` when the mode's policy
    /// says the transition counts.
    pub fn record(&mut self, prior: Option<(ViewClass, HistoryEntry)>, target: ViewClass) {
        self.forward.clear();
        let Some((from, entry)) = prior else {
            return;
        };
        let push = match self.mode {
            HistoryMode::Unified => true,
            HistoryMode::Separate => {
                from == ViewClass::Content && target == ViewClass::Content
            }
        };
        if push {
            self.back.push(entry);
        }
    }

    /// Pop the most recent back entry
    pub fn pop_back(&mut self) -> Option<HistoryEntry> {
        self.back.pop()
    }

    /// Pop the most recent forward entry
    pub fn pop_forward(&mut self) -> Option<HistoryEntry> {
        self.forward.pop()
    }

    /// Push onto the back stack during a forward traversal
    pub fn push_back(&mut self, entry: HistoryEntry) {
        self.back.push(entry);
    }

    /// Push onto the forward stack during a back traversal
    pub fn push_forward(&mut self, entry: HistoryEntry) {
        self.forward.push(entry);
    }

    #[must_use]
    pub fn back_len(&self) -> usize {
        self.back.len()
    }

    #[must_use]
    pub fn forward_len(&self) -> usize {
        self.forward.len()
    }
}
