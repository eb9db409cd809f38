//! Core traits for the UI abstraction layer

/// Desired viewport size class
///
/// The renderer owns actual screen geometry; the engine only states
/// whether the view is a compact pick-list or a full document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// Compact viewport, e.g. a disambiguation list
    Small,
    /// Full-size viewport for page content
    Large,
}

/// Where the viewport should appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Near the point the lookup was invoked from
    NearCursor,
    /// Centered on the screen
    Centered,
}

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Parameters for one display request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    /// Title for the viewport, e.g. the page being shown
    pub title: String,
    pub size: SizeClass,
    pub placement: Placement,
}

impl ViewRequest {
    /// View request for rendered page content
    #[must_use]
    pub fn content(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            size: SizeClass::Large,
            placement: Placement::Centered,
        }
    }

    /// View request for a disambiguation pick-list
    #[must_use]
    pub fn selection(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            size: SizeClass::Small,
            placement: Placement::NearCursor,
        }
    }
}

/// Displays ordered text lines in a scrollable, closable viewport
///
/// Implementations must support being torn down and recreated repeatedly
/// within one session; the engine re-issues `display` for every
/// navigation step.
pub trait Renderer {
    /// Show the lines, replacing any currently displayed view
    fn display(&mut self, lines: &[String], view: &ViewRequest);

    /// Tear the current viewport down, if one is open
    fn close(&mut self);
}

/// Single-line, severity-tagged user messages
pub trait Notifier {
    fn notify(&self, severity: Severity, message: &str);
}

/// Triggers the host's own documentation-hover mechanism
pub trait HoverFallback {
    fn trigger(&self);
}
