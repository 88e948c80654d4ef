//! Demo modal overlay: a centred window playing the showcase script.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Widget},
};

use crate::app::state::Transcript;
use crate::ui::transcript::TranscriptWidget;

/// Full-demo popup.  Renders the modal transcript with a close hint.
pub struct DemoModal<'a> {
    pub transcript: &'a Transcript,
    pub tick: u64,
    /// Display string for the close binding (e.g. `"Esc"`).
    pub close_hint: String,
}

impl<'a> DemoModal<'a> {
    /// Where the modal lands inside `area`; also used for backdrop hit-testing.
    pub fn area(area: Rect) -> Rect {
        centered_fixed(58, 12, area)
    }

    /// Render and return the occupied rect.
    pub fn render_and_hit(self, area: Rect, buf: &mut Buffer) -> Rect {
        let popup = Self::area(area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" SirenaMap · demo completa ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .title_bottom(Line::from(Span::styled(
                format!(" {}: cerrar ", self.close_hint),
                Style::default().fg(Color::DarkGray),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        TranscriptWidget::new(self.transcript, self.tick)
            .block(block)
            .render(popup, buf);
        popup
    }
}

impl<'a> Widget for DemoModal<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_and_hit(area, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_is_centred_and_clamped() {
        assert_eq!(DemoModal::area(Rect::new(0, 0, 100, 40)), Rect::new(21, 14, 58, 12));
        assert_eq!(DemoModal::area(Rect::new(0, 0, 30, 8)), Rect::new(0, 0, 30, 8));
    }

    #[test]
    fn render_reports_its_area() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        let transcript = Transcript::default();
        let hit = DemoModal {
            transcript: &transcript,
            tick: 0,
            close_hint: "Esc".into(),
        }
        .render_and_hit(area, &mut buf);
        assert_eq!(hit, DemoModal::area(area));
    }
}
