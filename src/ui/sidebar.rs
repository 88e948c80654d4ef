//! Demo sidebar: lists the playable demos and their shortcuts.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::config::{Action, AppConfig};
use crate::core::script::DemoKind;
use crate::ui::theme::Theme;

pub struct Sidebar<'a> {
    pub config: &'a AppConfig,
    /// Demo currently shown in the terminal pane, highlighted.
    pub current: Option<DemoKind>,
}

impl<'a> Sidebar<'a> {
    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for &action in Action::ALL {
            let marker = match action.demo() {
                Some(kind) if Some(kind) == self.current => "▸ ",
                _ => "  ",
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<9}", self.config.display_bindings(action)), Theme::key_style()),
                Span::raw(" "),
                Span::raw(action.label()),
            ]));
            if let Some(kind) = action.demo().or((action == Action::OpenShowcase).then_some(DemoKind::Showcase)) {
                lines.push(Line::from(Span::styled(
                    format!("             {}", kind.summary()),
                    Theme::placeholder_style(),
                )));
            }
        }
        lines
    }
}

impl<'a> Widget for Sidebar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Demos ")
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        Paragraph::new(self.lines()).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn lists_every_action_and_marks_current_demo() {
        let config = AppConfig::default();
        let lines = Sidebar {
            config: &config,
            current: Some(DemoKind::List),
        }
        .lines();
        let rendered: Vec<String> = lines.iter().map(text).collect();

        for &action in Action::ALL {
            assert!(rendered.iter().any(|l| l.contains(action.label())), "{action:?}");
        }
        let marked: Vec<_> = rendered.iter().filter(|l| l.starts_with("▸ ")).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("List demo"));
    }
}
