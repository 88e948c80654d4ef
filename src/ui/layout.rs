//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Sidebar width in the wide layout.
const SIDEBAR_WIDTH: u16 = 34;

/// Primary screen layout: terminal pane, optional demo sidebar, and a
/// bottom status bar.
pub struct AppLayout {
    pub terminal_area: Rect,
    /// `None` in the compact layout.
    pub sidebar_area: Option<Rect>,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect, compact: bool) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // main pane (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        if compact {
            return Self {
                terminal_area: rows[0],
                sidebar_area: None,
                status_area: rows[1],
            };
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
            .split(rows[0]);

        Self {
            terminal_area: cols[0],
            sidebar_area: Some(cols[1]),
            status_area: rows[1],
        }
    }
}
