//! User configuration: keybindings, typing pace, and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/sirena-demo/config.toml` (default `~/.config/sirena-demo/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::script::DemoKind;
use crate::core::timing::{TimingConfig, DEFAULT_CHAR_DELAY_MAX, DEFAULT_CHAR_DELAY_MIN, DEFAULT_LINE_PAUSE};

/// Pre-roll before a terminal demo starts typing (the "loading" line).
pub const DEFAULT_LEAD_IN: Duration = Duration::from_millis(1000);

/// Upper bound for any timing value read from disk or the CLI.
const MAX_DELAY_MS: u64 = 10_000;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RunNavigate,
    RunLocate,
    RunList,
    RunOffers,
    OpenShowcase,
    /// Close the modal if open, otherwise stop the terminal demo.
    Dismiss,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the sidebar).
    pub const ALL: &[Action] = &[
        Action::RunNavigate,
        Action::RunLocate,
        Action::RunList,
        Action::RunOffers,
        Action::OpenShowcase,
        Action::Dismiss,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::RunNavigate => "Navigate demo",
            Action::RunLocate => "Locate demo",
            Action::RunList => "List demo",
            Action::RunOffers => "Offers demo",
            Action::OpenShowcase => "Full demo",
            Action::Dismiss => "Close / stop",
            Action::Quit => "Quit",
        }
    }

    /// The terminal demo this action plays, if any.
    pub fn demo(self) -> Option<DemoKind> {
        match self {
            Action::RunNavigate => Some(DemoKind::Navigate),
            Action::RunLocate => Some(DemoKind::Locate),
            Action::RunList => Some(DemoKind::List),
            Action::RunOffers => Some(DemoKind::Offers),
            Action::OpenShowcase | Action::Dismiss | Action::Quit => None,
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::RunNavigate => "run_navigate",
            Action::RunLocate => "run_locate",
            Action::RunList => "run_list",
            Action::RunOffers => "run_offers",
            Action::OpenShowcase => "open_showcase",
            Action::Dismiss => "dismiss",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared (platform-specific modifiers like SUPER are ignored).
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Ctrl+1"`, `"Esc"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            other => key_name(other),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Ctrl+1"`, `"Esc"`).
    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            other => key_name(other),
        });
        s
    }

    /// Parse a key string like `"Ctrl+1"`, `"Alt+Up"`, `"q"`, `"Esc"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            // Single characters keep their case so `Q` and `q` stay distinct.
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Delete => "Delete".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── pace ──────────────

/// Typing pace as stored on disk (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceConfig {
    pub char_delay_min_ms: u64,
    pub char_delay_max_ms: u64,
    pub line_pause_ms: u64,
    /// Pre-roll for terminal demos.  The modal showcase starts immediately.
    pub lead_in_ms: u64,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            char_delay_min_ms: DEFAULT_CHAR_DELAY_MIN.as_millis() as u64,
            char_delay_max_ms: DEFAULT_CHAR_DELAY_MAX.as_millis() as u64,
            line_pause_ms: DEFAULT_LINE_PAUSE.as_millis() as u64,
            lead_in_ms: DEFAULT_LEAD_IN.as_millis() as u64,
        }
    }
}

impl PaceConfig {
    /// Clamp every value into a sane range and make `max >= min`.
    pub fn normalised(mut self) -> Self {
        self.char_delay_min_ms = self.char_delay_min_ms.min(MAX_DELAY_MS);
        self.char_delay_max_ms = self
            .char_delay_max_ms
            .clamp(self.char_delay_min_ms, MAX_DELAY_MS);
        self.line_pause_ms = self.line_pause_ms.min(MAX_DELAY_MS);
        self.lead_in_ms = self.lead_in_ms.min(MAX_DELAY_MS);
        self
    }

    /// Sequencer timing without the pre-roll.
    pub fn timing(&self) -> TimingConfig {
        TimingConfig {
            char_delay_min: Duration::from_millis(self.char_delay_min_ms),
            char_delay_max: Duration::from_millis(self.char_delay_max_ms),
            line_pause: Duration::from_millis(self.line_pause_ms),
            lead_in: Duration::ZERO,
        }
    }

    pub fn lead_in(&self) -> Duration {
        Duration::from_millis(self.lead_in_ms)
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: keybindings and typing pace.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub pace: PaceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            pace: PaceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Built-in defaults: `Ctrl+1`..`Ctrl+4` (plus bare digits, since many
    /// terminals swallow Ctrl+digit), `d` for the full demo, `Esc` to close.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let mut m = HashMap::new();

        m.insert(RunNavigate, vec![KeyBind::new(Char('1'), ctrl), KeyBind::new(Char('1'), n)]);
        m.insert(RunLocate, vec![KeyBind::new(Char('2'), ctrl), KeyBind::new(Char('2'), n)]);
        m.insert(RunList, vec![KeyBind::new(Char('3'), ctrl), KeyBind::new(Char('3'), n)]);
        m.insert(RunOffers, vec![KeyBind::new(Char('4'), ctrl), KeyBind::new(Char('4'), n)]);
        m.insert(OpenShowcase, vec![KeyBind::new(Char('d'), n)]);
        m.insert(Dismiss, vec![KeyBind::new(Esc, n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Format the binding list for a given action (e.g. `"Ctrl+1/1"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the last binding only (the plain key, for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action).and_then(|b| b.last()) {
            Some(bind) => bind.display(),
            None => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}-{}: demos | {}: full demo | {}: stop | {}: quit",
            self.short_binding(Action::RunNavigate),
            self.short_binding(Action::RunOffers),
            self.short_binding(Action::OpenShowcase),
            self.short_binding(Action::Dismiss),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
                Self::default()
            }
        }
    }

    /// Persist current config to disk.  Returns the path written.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(path)
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            // Pace settings.
            let pace_slot = match key {
                "char_delay_min_ms" => Some(&mut config.pace.char_delay_min_ms),
                "char_delay_max_ms" => Some(&mut config.pace.char_delay_max_ms),
                "line_pause_ms" => Some(&mut config.pace.line_pause_ms),
                "lead_in_ms" => Some(&mut config.pace.lead_in_ms),
                _ => None,
            };
            if let Some(slot) = pace_slot {
                match value.parse::<u64>() {
                    Ok(v) => *slot = v,
                    Err(_) => tracing::warn!("ignoring non-numeric {key} = {value}"),
                }
                continue;
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!("ignoring unknown config key {key}");
                continue;
            };

            let mut parsed = Vec::new();
            for part in value.split(',') {
                let part = part.trim().trim_matches('"');
                if let Some(bind) = KeyBind::parse(part) {
                    parsed.push(bind);
                }
            }
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config.pace = config.pace.normalised();
        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# sirena-demo configuration".to_string(),
            String::new(),
            "# Typing pace (milliseconds)".to_string(),
            format!("char_delay_min_ms = {}", self.pace.char_delay_min_ms),
            format!("char_delay_max_ms = {}", self.pace.char_delay_max_ms),
            format!("line_pause_ms = {}", self.pace.line_pause_ms),
            format!("lead_in_ms = {}", self.pace.lead_in_ms),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Backspace, Delete, Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/sirena-demo/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn default_bindings_cover_every_action() {
        let config = AppConfig::default();
        for &action in Action::ALL {
            assert_ne!(config.display_bindings(action), "unbound", "{action:?}");
        }
    }

    #[test]
    fn ctrl_digit_and_bare_digit_both_run_demos() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::Char('3'), KeyModifiers::CONTROL)),
            Some(Action::RunList)
        );
        assert_eq!(
            config.match_key(key(KeyCode::Char('3'), KeyModifiers::NONE)),
            Some(Action::RunList)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('5'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig::default();
        config.pace.line_pause_ms = 250;
        config.pace.lead_in_ms = 0;
        config
            .bindings
            .insert(Action::Quit, vec![KeyBind::new(KeyCode::Char('x'), KeyModifiers::ALT)]);

        let parsed = AppConfig::parse_config(&config.serialise());
        assert_eq!(parsed.pace, config.pace);
        assert_eq!(parsed.bindings, config.bindings);
    }

    #[test]
    fn malformed_entries_fall_back_to_defaults() {
        let parsed = AppConfig::parse_config(
            "line_pause_ms = soon\n\
             not a setting\n\
             run_navigate = Hyper+1\n\
             teleport = t\n\
             char_delay_min_ms = 12\n",
        );
        assert_eq!(parsed.pace.line_pause_ms, PaceConfig::default().line_pause_ms);
        assert_eq!(parsed.pace.char_delay_min_ms, 12);
        assert_eq!(
            parsed.bindings.get(&Action::RunNavigate),
            AppConfig::default_bindings().get(&Action::RunNavigate)
        );
    }

    #[test]
    fn pace_is_normalised() {
        let parsed = AppConfig::parse_config(
            "char_delay_min_ms = 80\nchar_delay_max_ms = 20\nline_pause_ms = 999999\n",
        );
        assert_eq!(parsed.pace.char_delay_min_ms, 80);
        assert_eq!(parsed.pace.char_delay_max_ms, 80);
        assert_eq!(parsed.pace.line_pause_ms, MAX_DELAY_MS);
    }

    #[test]
    fn pace_converts_to_timing_without_lead_in() {
        let timing = PaceConfig::default().timing();
        assert_eq!(timing.char_delay_min, DEFAULT_CHAR_DELAY_MIN);
        assert_eq!(timing.char_delay_max, DEFAULT_CHAR_DELAY_MAX);
        assert_eq!(timing.line_pause, DEFAULT_LINE_PAUSE);
        assert!(timing.lead_in.is_zero());
        assert_eq!(PaceConfig::default().lead_in(), DEFAULT_LEAD_IN);
    }

    #[test]
    fn key_strings_round_trip() {
        for s in ["Ctrl+1", "Esc", "q", "Q", "Alt+Up", "Shift+F5", "Space"] {
            let bind = KeyBind::parse(s).unwrap_or_else(|| panic!("{s} should parse"));
            assert_eq!(bind.to_config_string(), s);
        }
        assert!(KeyBind::parse("Meta+x").is_none());
        assert!(KeyBind::parse("NotAKey").is_none());
    }

    #[test]
    fn status_hint_uses_plain_keys() {
        let hint = AppConfig::default().status_bar_hint();
        assert!(hint.starts_with("1-4: demos"), "{hint}");
        assert!(hint.contains("Esc: stop"));
    }
}
