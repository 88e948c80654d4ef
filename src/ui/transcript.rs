//! Transcript widget: renders a typewriter surface as terminal output.
//!
//! Lines starting with `$` get a coloured prompt.  While a run is typing, a
//! cursor block trails the newest line; during the pre-roll a loading line
//! with cycling dots stands in for the output.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::app::state::Transcript;
use crate::ui::theme::Theme;

/// Ticks per loading-dot step (100 ms ticks → 500 ms, as on the web page).
const DOT_TICKS: u64 = 5;
const CURSOR: &str = "▋";

pub struct TranscriptWidget<'a> {
    transcript: &'a Transcript,
    /// Lines scrolled back from the bottom.
    scroll_offset: usize,
    tick: u64,
    placeholder: &'a str,
    block: Option<Block<'a>>,
}

impl<'a> TranscriptWidget<'a> {
    pub fn new(transcript: &'a Transcript, tick: u64) -> Self {
        Self {
            transcript,
            scroll_offset: 0,
            tick,
            placeholder: "",
            block: None,
        }
    }

    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Text shown while nothing has been played yet.
    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Every line the transcript would show, newest last.
    fn all_lines(&self) -> Vec<Line<'a>> {
        let t = self.transcript;
        if t.loading {
            let dots = ".".repeat(((self.tick / DOT_TICKS) % 3 + 1) as usize);
            return vec![Line::from(vec![
                Span::styled("$", Theme::prompt_style()),
                Span::styled(format!(" Ejecutando comando{dots}"), Theme::loading_style()),
            ])];
        }
        if t.lines.is_empty() && !t.running {
            return vec![Line::from(Span::styled(self.placeholder, Theme::placeholder_style()))];
        }

        let last = t.lines.len().saturating_sub(1);
        t.lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut spans = match text.strip_prefix('$') {
                    Some(rest) => vec![
                        Span::styled("$", Theme::prompt_style()),
                        Span::styled(rest, Theme::output_style()),
                    ],
                    None => vec![Span::styled(text.as_str(), Theme::output_style())],
                };
                if t.running && i == last {
                    spans.push(Span::styled(CURSOR, Theme::cursor_style()));
                }
                Line::from(spans)
            })
            .collect()
    }

    /// The window of lines that fits in `height`, honouring the scroll offset.
    fn visible_lines(&self, height: usize) -> Vec<Line<'a>> {
        let lines = self.all_lines();
        let end = lines.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(height);
        lines.into_iter().skip(start).take(end - start).collect()
    }
}

impl<'a> Widget for TranscriptWidget<'a> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        let lines = self.visible_lines(inner.height as usize);
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::script::DemoKind;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn typed(lines: &[&str], running: bool) -> Transcript {
        let mut t = Transcript::default();
        t.begin(1, DemoKind::Navigate, false);
        t.lines = lines.iter().map(|s| s.to_string()).collect();
        t.running = running;
        t
    }

    #[test]
    fn loading_dots_cycle_every_half_second() {
        let mut t = Transcript::default();
        t.begin(1, DemoKind::Locate, true);
        let at = |tick| text(&TranscriptWidget::new(&t, tick).all_lines()[0]);
        assert_eq!(at(0), "$ Ejecutando comando.");
        assert_eq!(at(5), "$ Ejecutando comando..");
        assert_eq!(at(10), "$ Ejecutando comando...");
        assert_eq!(at(15), "$ Ejecutando comando.");
    }

    #[test]
    fn cursor_trails_newest_line_only_while_running() {
        let t = typed(&["$ sirenamap list", "📋 Carg"], true);
        let lines = TranscriptWidget::new(&t, 0).all_lines();
        assert_eq!(text(&lines[0]), "$ sirenamap list");
        assert_eq!(text(&lines[1]), format!("📋 Carg{CURSOR}"));

        let done = typed(&["$ sirenamap list"], false);
        assert_eq!(text(&TranscriptWidget::new(&done, 0).all_lines()[0]), "$ sirenamap list");
    }

    #[test]
    fn placeholder_shows_when_idle_and_empty() {
        let t = Transcript::default();
        let lines = TranscriptWidget::new(&t, 0).placeholder("press 1-4").all_lines();
        assert_eq!(text(&lines[0]), "press 1-4");
    }

    #[test]
    fn window_follows_bottom_and_scrolls_back() {
        let t = typed(&["a", "b", "c", "d", "e"], false);
        let tail: Vec<_> = TranscriptWidget::new(&t, 0).visible_lines(2).iter().map(text).collect();
        assert_eq!(tail, vec!["d", "e"]);

        let back: Vec<_> = TranscriptWidget::new(&t, 0)
            .scroll_offset(2)
            .visible_lines(2)
            .iter()
            .map(text)
            .collect();
        assert_eq!(back, vec!["b", "c"]);
    }

    #[test]
    fn renders_into_buffer() {
        let t = typed(&["$ ok"], false);
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        TranscriptWidget::new(&t, 0).render(area, &mut buf);
        let row: String = (0..4u16).map(|x| buf[(x, 0u16)].symbol().to_string()).collect();
        assert_eq!(row, "$ ok");
    }
}
