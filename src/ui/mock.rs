//! Recording mock frontends for testing
//!
//! Each mock hands out a cloneable handle to its call log, so tests keep
//! the handle and give the mock itself to the engine.

use std::sync::{Arc, Mutex};

use super::traits::{HoverFallback, Notifier, Renderer, Severity, ViewRequest};

/// One recorded display call
#[derive(Debug, Clone)]
pub struct DisplayCall {
    pub lines: Vec<String>,
    pub view: ViewRequest,
}

/// Renderer that records every display and close call
#[derive(Clone, Default)]
pub struct MockRenderer {
    displays: Arc<Mutex<Vec<DisplayCall>>>,
    closes: Arc<Mutex<usize>>,
}

impl MockRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded display calls, oldest first
    #[must_use]
    pub fn displays(&self) -> Vec<DisplayCall> {
        self.displays.lock().unwrap().clone()
    }

    /// The most recent display call
    #[must_use]
    pub fn last_display(&self) -> Option<DisplayCall> {
        self.displays.lock().unwrap().last().cloned()
    }

    /// Number of close calls
    #[must_use]
    pub fn close_count(&self) -> usize {
        *self.closes.lock().unwrap()
    }
}

impl Renderer for MockRenderer {
    fn display(&mut self, lines: &[String], view: &ViewRequest) {
        self.displays.lock().unwrap().push(DisplayCall {
            lines: lines.to_vec(),
            view: view.clone(),
        });
    }

    fn close(&mut self) {
        *self.closes.lock().unwrap() += 1;
    }
}

/// Notifier that records every message
#[derive(Clone, Default)]
pub struct MockNotifier {
    messages: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages, oldest first
    #[must_use]
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

/// Hover fallback that counts its triggers
#[derive(Clone, Default)]
pub struct MockHover {
    triggers: Arc<Mutex<usize>>,
}

impl MockHover {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the fallback fired
    #[must_use]
    pub fn trigger_count(&self) -> usize {
        *self.triggers.lock().unwrap()
    }
}

impl HoverFallback for MockHover {
    fn trigger(&self) {
        *self.triggers.lock().unwrap() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_renderer_records_calls() {
        let mock = MockRenderer::new();
        let mut boxed: Box<dyn Renderer> = Box::new(mock.clone());

        boxed.display(&["line".into()], &ViewRequest::content("printf"));
        boxed.close();

        assert_eq!(mock.displays().len(), 1);
        assert_eq!(mock.last_display().unwrap().view.title, "printf");
        assert_eq!(mock.close_count(), 1);
    }

    #[test]
    fn test_mock_notifier_records_severity() {
        let mock = MockNotifier::new();
        mock.notify(Severity::Warn, "careful");
        assert_eq!(mock.messages(), vec![(Severity::Warn, "careful".into())]);
    }
}
