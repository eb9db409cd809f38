//! Interactive pager frontend
//!
//! A ratatui viewport driven by the engine's asynchronous path: the
//! renderer writes into shared view state, the event loop pumps the
//! engine's completion channel between input polls, and navigation keys
//! map onto the engine's history operations.
//!
//! Keys: `j`/`k`/arrows scroll, `d`/`u` half-page, `g`/`G` jump,
//! `1`-`9` pick a disambiguation option, `b`/Left go back, `f`/Right go
//! forward, `K` follow a term (typed into the status line), `q` quit.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use super::traits::{HoverFallback, Notifier, Renderer, Severity, SizeClass, ViewRequest};
use crate::DocrError;
use crate::engine::{Engine, ViewKind};

/// Snapshot of what the pager should draw
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub title: String,
    pub lines: Vec<String>,
    pub small: bool,
    pub open: bool,
    /// Bumped on every display so the pager can reset its scroll
    pub version: u64,
}

/// Shared view state written by the renderer, read by the event loop
#[derive(Clone, Default)]
pub struct SharedView(Arc<Mutex<ViewState>>);

impl SharedView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.0.lock().unwrap().clone()
    }
}

/// Renderer feeding the shared view state
pub struct TuiRenderer {
    view: SharedView,
}

impl TuiRenderer {
    #[must_use]
    pub fn new(view: SharedView) -> Self {
        Self { view }
    }
}

impl Renderer for TuiRenderer {
    fn display(&mut self, lines: &[String], view: &ViewRequest) {
        let mut state = self.view.0.lock().unwrap();
        state.title = view.title.clone();
        state.lines = lines.to_vec();
        state.small = view.size == SizeClass::Small;
        state.open = true;
        state.version += 1;
    }

    fn close(&mut self) {
        let mut state = self.view.0.lock().unwrap();
        state.open = false;
        state.version += 1;
    }
}

/// One-line status message slot shown in the pager's bottom bar
#[derive(Clone, Default)]
pub struct StatusLine(Arc<Mutex<Option<(Severity, String)>>>);

impl StatusLine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<(Severity, String)> {
        self.0.lock().unwrap().clone()
    }

    fn set(&self, severity: Severity, message: &str) {
        *self.0.lock().unwrap() = Some((severity, message.to_string()));
    }

    fn clear(&self) {
        *self.0.lock().unwrap() = None;
    }
}

/// Notifier writing into the status line
pub struct TuiNotifier {
    status: StatusLine,
}

impl TuiNotifier {
    #[must_use]
    pub fn new(status: StatusLine) -> Self {
        Self { status }
    }
}

impl Notifier for TuiNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.status.set(severity, message);
    }
}

/// Hover fallback in a standalone pager: no host editor is listening, so
/// the request surfaces as a status hint
pub struct TuiHover {
    status: StatusLine,
}

impl TuiHover {
    #[must_use]
    pub fn new(status: StatusLine) -> Self {
        Self { status }
    }
}

impl HoverFallback for TuiHover {
    fn trigger(&self) {
        self.status
            .set(Severity::Info, "No entry found (hover fallback not wired up)");
    }
}

enum InputMode {
    Normal,
    /// Collecting a term for a follow lookup
    Follow(String),
}

/// Run the pager until the user quits
///
/// # Errors
///
/// Returns `DocrError` for terminal I/O failures or an unknown adapter
/// domain.
pub fn run(
    engine: &mut Engine,
    view: &SharedView,
    status: &StatusLine,
    domain: &str,
    query: &str,
    width_override: Option<u16>,
) -> Result<(), DocrError> {
    let mut terminal = ratatui::init();
    let result = event_loop(engine, view, status, domain, query, width_override, &mut terminal);
    ratatui::restore();
    result
}

#[allow(clippy::too_many_arguments)]
fn event_loop(
    engine: &mut Engine,
    view: &SharedView,
    status: &StatusLine,
    domain: &str,
    query: &str,
    width_override: Option<u16>,
    terminal: &mut DefaultTerminal,
) -> Result<(), DocrError> {
    let size = terminal.size()?;
    let width = width_override.unwrap_or_else(|| size.width.saturating_sub(4).max(20));

    engine.lookup(domain, query, width)?;

    let mut scroll: u16 = 0;
    let mut seen_version = 0;
    let mut mode = InputMode::Normal;

    loop {
        engine.pump();

        let snapshot = view.snapshot();
        if snapshot.version != seen_version {
            seen_version = snapshot.version;
            scroll = 0;
        }

        terminal.draw(|frame| draw(frame, &snapshot, scroll, engine, status, &mode))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match &mut mode {
            InputMode::Follow(buffer) => match key.code {
                KeyCode::Esc => mode = InputMode::Normal,
                KeyCode::Enter => {
                    let word = buffer.trim().to_string();
                    mode = InputMode::Normal;
                    if !word.is_empty() {
                        status.clear();
                        engine.follow(&word);
                    }
                }
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => {}
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    engine.close();
                    return Ok(());
                }
                KeyCode::Char('j') | KeyCode::Down => scroll = scroll.saturating_add(1),
                KeyCode::Char('k') | KeyCode::Up => scroll = scroll.saturating_sub(1),
                KeyCode::Char('d') | KeyCode::PageDown => scroll = scroll.saturating_add(15),
                KeyCode::Char('u') | KeyCode::PageUp => scroll = scroll.saturating_sub(15),
                KeyCode::Char('g') | KeyCode::Home => scroll = 0,
                KeyCode::Char('G') | KeyCode::End => {
                    scroll = clamp_scroll(u16::MAX, &snapshot);
                }
                KeyCode::Char('b') | KeyCode::Left => {
                    status.clear();
                    engine.go_back();
                }
                KeyCode::Char('f') | KeyCode::Right => {
                    status.clear();
                    engine.go_forward();
                }
                KeyCode::Char('K') => mode = InputMode::Follow(String::new()),
                KeyCode::Char(c @ '1'..='9') => {
                    if matches!(engine.view(), ViewKind::Selection(_)) {
                        status.clear();
                        engine.select(u32::from(c as u8 - b'0'));
                    }
                }
                _ => {}
            },
        }
        scroll = clamp_scroll(scroll, &view.snapshot());
    }
}

fn clamp_scroll(scroll: u16, snapshot: &ViewState) -> u16 {
    let max = u16::try_from(snapshot.lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
    scroll.min(max)
}

fn draw(
    frame: &mut ratatui::Frame,
    snapshot: &ViewState,
    scroll: u16,
    engine: &Engine,
    status: &StatusLine,
    mode: &InputMode,
) {
    let [content_area, bar_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    let mut title = snapshot.title.clone();
    if engine.is_loading() {
        title.push_str(" …");
    }
    let body = if snapshot.open {
        snapshot.lines.join("\n")
    } else {
        String::from("(no view open; K to look something up, q to quit)")
    };
    let paragraph = Paragraph::new(body)
        .block(Block::bordered().title(title))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, content_area);

    let bar = match mode {
        InputMode::Follow(buffer) => Line::from(format!("follow: {buffer}_").bold()),
        InputMode::Normal => {
            let mut text = format!(
                " {}  back:{} fwd:{}",
                engine.current_page().unwrap_or("-"),
                engine.history().back_len(),
                engine.history().forward_len(),
            );
            if matches!(engine.view(), ViewKind::Selection(_)) {
                text.push_str(&format!("  ready:{}", engine.ready_selections().len()));
            }
            match status.current() {
                Some((Severity::Error, message)) => {
                    Line::from(vec![text.into(), "  ".into(), message.red()])
                }
                Some((Severity::Warn, message)) => {
                    Line::from(vec![text.into(), "  ".into(), message.yellow()])
                }
                Some((Severity::Info, message)) => {
                    Line::from(vec![text.into(), "  ".into(), message.dim()])
                }
                None => Line::from(text),
            }
        }
    };
    frame.render_widget(Paragraph::new(bar), bar_area);
}
