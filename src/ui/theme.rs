//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── transcript ─────────────────────────────────────────────
    pub fn prompt_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn output_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn loading_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn cursor_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::SLOW_BLINK)
    }

    pub fn placeholder_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
