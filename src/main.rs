//! Terminal player for the SirenaMap typewriter demos.
//!
//! Run the binary to launch the interactive demo terminal.
//! Run with `--play <demo>` or `--script <file>` to type a script straight
//! to stdout instead.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr, Stderr, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::{mpsc, oneshot};

use crate::app::{
    demo_runtime::DemoRuntime,
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState, DemoUpdate},
};
use crate::config::{Action, AppConfig, PaceConfig};
use crate::core::script::{DemoKind, Script};
use crate::core::sequencer::{Hooks, Sequencer, Status};
use crate::ui::{
    layout::AppLayout, popup::DemoModal, sidebar::Sidebar, spinner::RunIndicator, theme::Theme,
    transcript::TranscriptWidget,
};

/// Input poll interval; also the animation tick (spinner, loading dots).
const TICK_RATE: Duration = Duration::from_millis(100);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "SirenaMap terminal demo player")]
struct Cli {
    /// List the built-in demos and exit.
    #[arg(long)]
    list: bool,

    /// Type a built-in demo to stdout and exit.
    #[arg(long, value_name = "DEMO", conflicts_with = "script")]
    play: Option<String>,

    /// Type the lines of a text file to stdout and exit.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Shortest per-character delay.
    #[arg(long, value_name = "MS")]
    char_min_ms: Option<u64>,

    /// Longest per-character delay (exclusive).
    #[arg(long, value_name = "MS")]
    char_max_ms: Option<u64>,

    /// Pause after each line.
    #[arg(long, value_name = "MS")]
    line_pause_ms: Option<u64>,

    /// Loading pre-roll before a terminal demo starts typing.
    #[arg(long, value_name = "MS")]
    lead_in_ms: Option<u64>,

    /// Save the effective configuration (including overrides) and exit.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    fn apply_overrides(&self, pace: &mut PaceConfig) {
        if let Some(v) = self.char_min_ms {
            pace.char_delay_min_ms = v;
        }
        if let Some(v) = self.char_max_ms {
            pace.char_delay_max_ms = v;
        }
        if let Some(v) = self.line_pause_ms {
            pace.line_pause_ms = v;
        }
        if let Some(v) = self.lead_in_ms {
            pace.lead_in_ms = v;
        }
        *pace = pace.normalised();
    }

    /// The script to play headless, if one was requested.
    fn headless_script(&self) -> Result<Option<Script>> {
        if let Some(name) = &self.play {
            return Ok(Some(Script::from(DemoKind::from_name(name)?)));
        }
        if let Some(path) = &self.script {
            return Ok(Some(Script::load(path)?));
        }
        Ok(None)
    }
}

// ───────────────────────────────────────── headless ──────────

/// Type `script` to stdout, redrawing the current line in place.
/// Ctrl+c cancels the run.
async fn play_headless(script: Script, pace: &PaceConfig) -> Result<()> {
    let sequencer = Sequencer::new(pace.timing());
    let (done_tx, done_rx) = oneshot::channel();

    let hooks = Hooks::new()
        .on_character(|text, _| {
            let mut out = io::stdout().lock();
            let _ = write!(out, "\r{text}");
            let _ = out.flush();
        })
        .on_line_commit(|text, _| {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "\r{text}");
        })
        .on_complete(move || {
            let _ = done_tx.send(());
        });

    tracing::info!(lines = script.len(), chars = script.char_count(), "headless playback");
    sequencer.start(script, hooks);

    tokio::select! {
        _ = done_rx => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+c")?;
            if let Status::Running { line, char_idx, .. } = sequencer.status() {
                tracing::info!(line, char_idx, "playback interrupted");
            }
            sequencer.cancel();
            println!();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── TUI ───────────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area(), state.compact);

    let title = match state.terminal.demo {
        Some(kind) => format!(" sirenamap · {} ", kind.name()),
        None => " sirenamap ".to_string(),
    };
    let terminal_block = Block::default()
        .title(title)
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());

    frame.render_widget(
        TranscriptWidget::new(&state.terminal, state.tick)
            .scroll_offset(state.scroll_offset)
            .placeholder("$ pick a demo to run it")
            .block(terminal_block),
        layout.terminal_area,
    );
    frame.render_widget(
        RunIndicator {
            visible: state.terminal.running,
            tick: state.tick,
            label: if state.terminal.loading { "loading" } else { "typing" },
        },
        layout.terminal_area,
    );

    if let Some(area) = layout.sidebar_area {
        frame.render_widget(
            Sidebar {
                config: &state.config,
                current: state.terminal.demo,
            },
            area,
        );
    }

    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    if state.active_view == ActiveView::DemoModal {
        let area = frame.area();
        let modal = DemoModal {
            transcript: &state.modal,
            tick: state.tick,
            close_hint: state.config.display_bindings(Action::Dismiss),
        };
        state.modal_area = Some(modal.render_and_hit(area, frame.buffer_mut()));
    }
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    mut state: AppState,
) -> Result<()> {
    let mut events = spawn_event_reader(TICK_RATE);
    let (demo_tx, mut demo_rx) = mpsc::unbounded_channel::<DemoUpdate>();
    let runtime = DemoRuntime::new(&state.config.pace, demo_tx);

    loop {
        terminal.draw(|frame| draw(frame, &mut state))?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(w, h) => handler::handle_resize(&mut state, w, h, Instant::now()),
                    AppEvent::Tick => handler::handle_tick(&mut state, Instant::now()),
                }
                runtime.apply_requests(&mut state);
            }

            Some(update) = demo_rx.recv() => {
                // Batch-drain everything already queued before redrawing so a
                // fast typist doesn't force one frame per character.
                DemoRuntime::apply_update(&mut state, update);
                while let Ok(update) = demo_rx.try_recv() {
                    DemoRuntime::apply_update(&mut state, update);
                }
            }

            else => break,
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

async fn run_tui(config: AppConfig) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let width = terminal.size()?.width;
    let result = event_loop(&mut terminal, AppState::new(config, width)).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise tracing (silent unless RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load();
    cli.apply_overrides(&mut config.pace);

    if cli.write_config {
        let path = config.save()?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    if cli.list {
        for &kind in DemoKind::ALL {
            println!("{:<10} {}", kind.name(), kind.summary());
        }
        return Ok(());
    }

    if let Some(script) = cli.headless_script()? {
        return play_headless(script, &config.pace).await;
    }

    run_tui(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_are_normalised() {
        let cli = Cli::parse_from(["sirena-demo", "--char-min-ms", "60", "--char-max-ms", "10"]);
        let mut pace = PaceConfig::default();
        cli.apply_overrides(&mut pace);
        assert_eq!(pace.char_delay_min_ms, 60);
        assert_eq!(pace.char_delay_max_ms, 60);
        assert_eq!(pace.line_pause_ms, PaceConfig::default().line_pause_ms);
    }

    #[test]
    fn play_and_script_conflict() {
        let parsed = Cli::try_parse_from(["sirena-demo", "--play", "list", "--script", "x.txt"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_demo_is_an_error() {
        let cli = Cli::parse_from(["sirena-demo", "--play", "checkout"]);
        let err = cli.headless_script().unwrap_err();
        assert!(err.to_string().contains("unknown demo"));
    }

    #[test]
    fn no_headless_flags_means_tui() {
        let cli = Cli::parse_from(["sirena-demo"]);
        assert!(cli.headless_script().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn headless_playback_finishes() {
        let pace = PaceConfig {
            char_delay_min_ms: 1,
            char_delay_max_ms: 2,
            line_pause_ms: 1,
            lead_in_ms: 0,
        };
        let script = Script::new(["$ ok", ""]);
        tokio::time::timeout(Duration::from_secs(5), play_headless(script, &pace))
            .await
            .expect("playback should finish")
            .unwrap();
    }
}
