//! Input handling: maps key/mouse/resize events to state mutations and
//! queued [`Request`]s for the demo runtime.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::config::Action;

use super::state::{ActiveView, AppState, Request};

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Terminal => handle_terminal_key(state, key),
        ActiveView::DemoModal => handle_modal_key(state, key),
    }
}

fn handle_terminal_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::PageUp => {
            state.scroll_by(5);
            return;
        }
        KeyCode::PageDown => {
            state.scroll_by(-5);
            return;
        }
        KeyCode::End => {
            state.scroll_offset = 0;
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenShowcase => state.requests.push(Request::OpenModal),
        Action::Dismiss => state.requests.push(Request::StopDemo),
        Action::RunNavigate | Action::RunLocate | Action::RunList | Action::RunOffers => {
            if let Some(kind) = action.demo() {
                state.requests.push(Request::RunDemo(kind));
            }
        }
    }
}

fn handle_modal_key(state: &mut AppState, key: KeyEvent) {
    // Demos keep their shortcuts while the modal is up; they play behind it.
    match state.config.match_key(key) {
        Some(Action::Dismiss) => state.requests.push(Request::CloseModal),
        Some(Action::Quit) => state.should_quit = true,
        Some(action) => {
            if let Some(kind) = action.demo() {
                state.requests.push(Request::RunDemo(kind));
            }
        }
        None => {}
    }
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    handle_mouse_at(state, mouse, Instant::now());
}

fn handle_mouse_at(state: &mut AppState, mouse: MouseEvent, now: Instant) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            // Backdrop click closes the modal.
            if state.active_view == ActiveView::DemoModal {
                let inside = state
                    .modal_area
                    .is_some_and(|area| point_in_rect(area, mouse.column, mouse.row));
                if !inside {
                    state.requests.push(Request::CloseModal);
                }
            }
        }
        MouseEventKind::ScrollUp if state.active_view == ActiveView::Terminal => {
            if let Some(delta) = state.scroll_throttle.call(now, 1) {
                state.scroll_by(delta);
            }
        }
        MouseEventKind::ScrollDown if state.active_view == ActiveView::Terminal => {
            if let Some(delta) = state.scroll_throttle.call(now, -1) {
                state.scroll_by(delta);
            }
        }
        _ => {}
    }
}

// ── Resize / tick ───────────────────────────────────────────────

pub fn handle_resize(state: &mut AppState, width: u16, height: u16, now: Instant) {
    state.resize_debounce.call(now, (width, height));
}

/// Advance tick-driven state and release any throttled/debounced input.
pub fn handle_tick(state: &mut AppState, now: Instant) {
    state.tick = state.tick.wrapping_add(1);
    if let Some(delta) = state.scroll_throttle.poll(now) {
        state.scroll_by(delta);
    }
    if let Some((width, height)) = state.resize_debounce.poll(now) {
        state.apply_resize(width, height);
    }
}

fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::AppConfig;
    use crate::core::script::DemoKind;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), 120)
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn digit_shortcuts_queue_demo_runs() {
        let mut s = state();
        handle_key(&mut s, press(KeyCode::Char('1'), KeyModifiers::CONTROL));
        handle_key(&mut s, press(KeyCode::Char('4'), KeyModifiers::NONE));
        assert_eq!(
            s.requests,
            vec![
                Request::RunDemo(DemoKind::Navigate),
                Request::RunDemo(DemoKind::Offers),
            ]
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let mut s = state();
        let mut key = press(KeyCode::Char('2'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key(&mut s, key);
        assert!(s.requests.is_empty());
    }

    #[test]
    fn escape_closes_modal_before_stopping_demo() {
        let mut s = state();
        s.active_view = ActiveView::DemoModal;
        handle_key(&mut s, press(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(s.requests, vec![Request::CloseModal]);

        s.requests.clear();
        s.active_view = ActiveView::Terminal;
        handle_key(&mut s, press(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(s.requests, vec![Request::StopDemo]);
    }

    #[test]
    fn ctrl_c_and_q_quit() {
        let mut s = state();
        handle_key(&mut s, press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(s.should_quit);

        let mut s = state();
        s.active_view = ActiveView::DemoModal;
        handle_key(&mut s, press(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(s.should_quit);
    }

    #[test]
    fn d_opens_the_showcase() {
        let mut s = state();
        handle_key(&mut s, press(KeyCode::Char('d'), KeyModifiers::NONE));
        assert_eq!(s.requests, vec![Request::OpenModal]);
    }

    #[test]
    fn backdrop_click_closes_modal_but_inside_click_does_not() {
        let mut s = state();
        s.active_view = ActiveView::DemoModal;
        s.modal_area = Some(Rect::new(10, 5, 40, 10));
        let now = Instant::now();

        handle_mouse_at(&mut s, mouse(MouseEventKind::Down(MouseButton::Left), 20, 8), now);
        assert!(s.requests.is_empty());

        handle_mouse_at(&mut s, mouse(MouseEventKind::Down(MouseButton::Left), 2, 2), now);
        assert_eq!(s.requests, vec![Request::CloseModal]);
    }

    #[test]
    fn wheel_scroll_is_throttled() {
        let mut s = state();
        s.terminal.lines = (0..20).map(|i| i.to_string()).collect();
        let t0 = Instant::now();

        for i in 0..5 {
            handle_mouse_at(&mut s, mouse(MouseEventKind::ScrollUp, 0, 0), t0 + Duration::from_millis(i));
        }
        // Leading event only; the rest coalesce into one trailing event.
        assert_eq!(s.scroll_offset, 1);
        handle_tick(&mut s, t0 + Duration::from_millis(20));
        assert_eq!(s.scroll_offset, 2);
        handle_tick(&mut s, t0 + Duration::from_millis(60));
        assert_eq!(s.scroll_offset, 2);
    }

    #[test]
    fn resize_applies_after_debounce() {
        let mut s = state();
        let t0 = Instant::now();
        handle_resize(&mut s, 60, 30, t0);
        handle_tick(&mut s, t0 + Duration::from_millis(100));
        assert!(!s.compact);
        handle_tick(&mut s, t0 + Duration::from_millis(300));
        assert!(s.compact);
    }
}
