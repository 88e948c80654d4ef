//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::time::Duration;

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::rate::{Debounce, Throttle};
use crate::core::script::DemoKind;

/// Scroll events faster than this are coalesced (~60 fps).
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(16);
/// Resize bursts settle for this long before the layout switches.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);
/// Below this width the compact (single-column) layout is used.
pub const COMPACT_WIDTH: u16 = 80;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Terminal,
    DemoModal,
}

/// The two places a typewriter run can render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Terminal,
    Modal,
}

/// One hook invocation, as delivered to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoEvent {
    LineStarted(usize),
    Character { line: usize, text: String },
    LineCommitted(usize),
    Completed,
}

/// A [`DemoEvent`] tagged with where it goes and which run produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoUpdate {
    pub surface: Surface,
    pub generation: u64,
    pub event: DemoEvent,
}

/// Work the input handler asks the demo runtime to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    RunDemo(DemoKind),
    OpenModal,
    CloseModal,
    StopDemo,
}

// ───────────────────────────────────────── transcript ───────

/// The rendered output of one surface.
#[derive(Debug, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
    /// Demo currently (or last) shown.
    pub demo: Option<DemoKind>,
    /// Monotonic id of the current run; updates from other ids are stale.
    pub generation: u64,
    pub running: bool,
    /// `true` during the pre-roll, until the first line starts.
    pub loading: bool,
}

impl Transcript {
    /// Generation the next run should be tagged with.
    pub fn next_generation(&self) -> u64 {
        self.generation.wrapping_add(1)
    }

    /// Clear the surface for a freshly accepted run.
    pub fn begin(&mut self, generation: u64, demo: DemoKind, loading: bool) {
        self.lines.clear();
        self.demo = Some(demo);
        self.generation = generation;
        self.running = true;
        self.loading = loading;
    }

    /// Stop accepting updates from the current run.  Text already typed stays.
    pub fn halt(&mut self) {
        self.generation = self.next_generation();
        self.running = false;
        self.loading = false;
    }

    /// Apply one update.  Returns `false` if it was stale and ignored.
    pub fn apply(&mut self, generation: u64, event: DemoEvent) -> bool {
        if generation != self.generation || !self.running {
            return false;
        }
        match event {
            DemoEvent::LineStarted(line) => {
                self.loading = false;
                self.ensure_line(line).clear();
            }
            DemoEvent::Character { line, text } => {
                // Append semantics: `text` is the whole line so far.
                *self.ensure_line(line) = text;
            }
            DemoEvent::LineCommitted(_) => {}
            DemoEvent::Completed => {
                self.running = false;
                self.loading = false;
            }
        }
        true
    }

    fn ensure_line(&mut self, line: usize) -> &mut String {
        if self.lines.len() <= line {
            self.lines.resize_with(line + 1, String::new);
        }
        &mut self.lines[line]
    }
}

// ───────────────────────────────────────── app state ────────

/// Top-level application state.
pub struct AppState {
    /// Terminal panel transcript.
    pub terminal: Transcript,
    /// Demo modal transcript.
    pub modal: Transcript,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// User-configurable keybindings and pace.
    pub config: AppConfig,
    /// Lines scrolled up from the bottom of the terminal transcript
    /// (`0` follows new output).
    pub scroll_offset: usize,
    /// Compact layout for narrow terminals.
    pub compact: bool,
    /// Area the modal occupied on the last frame, for backdrop clicks.
    pub modal_area: Option<Rect>,
    /// Monotonic tick counter (drives the loading dots and spinner).
    pub tick: u64,
    /// Requests queued by the input handler for the demo runtime.
    pub requests: Vec<Request>,
    pub scroll_throttle: Throttle<isize>,
    pub resize_debounce: Debounce<(u16, u16)>,
}

impl AppState {
    pub fn new(config: AppConfig, width: u16) -> Self {
        Self {
            terminal: Transcript::default(),
            modal: Transcript::default(),
            active_view: ActiveView::default(),
            should_quit: false,
            status_message: None,
            config,
            scroll_offset: 0,
            compact: width < COMPACT_WIDTH,
            modal_area: None,
            tick: 0,
            requests: Vec::new(),
            scroll_throttle: Throttle::new(SCROLL_THROTTLE),
            resize_debounce: Debounce::new(RESIZE_DEBOUNCE),
        }
    }

    pub fn transcript_mut(&mut self, surface: Surface) -> &mut Transcript {
        match surface {
            Surface::Terminal => &mut self.terminal,
            Surface::Modal => &mut self.modal,
        }
    }

    /// Scroll the terminal transcript by `delta` lines (positive = back in history).
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.terminal.lines.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max);
    }

    /// Apply a settled terminal size.
    pub fn apply_resize(&mut self, width: u16, height: u16) {
        let compact = width < COMPACT_WIDTH;
        if compact != self.compact {
            tracing::debug!(width, height, compact, "layout switched");
        }
        self.compact = compact;
        // Close the modal on a very short terminal, it would not fit.
        if height < 8 && self.active_view == ActiveView::DemoModal {
            self.requests.push(Request::CloseModal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(line: usize, text: &str) -> DemoEvent {
        DemoEvent::Character {
            line,
            text: text.into(),
        }
    }

    #[test]
    fn transcript_renders_whole_line_per_character() {
        let mut t = Transcript::default();
        let g = t.next_generation();
        t.begin(g, DemoKind::Navigate, true);
        assert!(t.loading);

        assert!(t.apply(g, DemoEvent::LineStarted(0)));
        assert!(!t.loading);
        t.apply(g, chars(0, "a"));
        t.apply(g, chars(0, "ab"));
        t.apply(g, DemoEvent::LineCommitted(0));
        t.apply(g, DemoEvent::LineStarted(1));
        t.apply(g, chars(1, "c"));
        assert_eq!(t.lines, vec!["ab", "c"]);

        t.apply(g, DemoEvent::Completed);
        assert!(!t.running);
    }

    #[test]
    fn stale_generations_are_ignored() {
        let mut t = Transcript::default();
        let first = t.next_generation();
        t.begin(first, DemoKind::List, false);
        t.apply(first, DemoEvent::LineStarted(0));
        t.apply(first, chars(0, "x"));

        t.halt();
        assert!(!t.apply(first, chars(0, "xy")));
        assert!(!t.apply(first, DemoEvent::Completed));
        assert_eq!(t.lines, vec!["x"]);

        let second = t.next_generation();
        assert_ne!(second, first);
        t.begin(second, DemoKind::Offers, false);
        assert!(t.lines.is_empty());
        assert!(!t.apply(first, DemoEvent::LineStarted(0)));
        assert!(t.apply(second, DemoEvent::LineStarted(0)));
    }

    #[test]
    fn empty_line_still_occupies_a_row() {
        let mut t = Transcript::default();
        let g = t.next_generation();
        t.begin(g, DemoKind::Showcase, false);
        t.apply(g, DemoEvent::LineStarted(0));
        t.apply(g, DemoEvent::LineCommitted(0));
        t.apply(g, DemoEvent::LineStarted(1));
        assert_eq!(t.lines, vec!["", ""]);
    }

    #[test]
    fn scroll_is_clamped_to_history() {
        let mut state = AppState::new(AppConfig::default(), 120);
        state.terminal.lines = vec!["a".into(), "b".into(), "c".into()];
        state.scroll_by(10);
        assert_eq!(state.scroll_offset, 2);
        state.scroll_by(-5);
        assert_eq!(state.scroll_offset, 0);
    }

    #[test]
    fn resize_switches_layout_at_threshold() {
        let mut state = AppState::new(AppConfig::default(), 120);
        assert!(!state.compact);
        state.apply_resize(COMPACT_WIDTH - 1, 40);
        assert!(state.compact);
        state.apply_resize(COMPACT_WIDTH, 40);
        assert!(!state.compact);
    }

    #[test]
    fn tiny_terminal_closes_the_modal() {
        let mut state = AppState::new(AppConfig::default(), 120);
        state.active_view = ActiveView::DemoModal;
        state.apply_resize(120, 5);
        assert_eq!(state.requests, vec![Request::CloseModal]);
    }
}
