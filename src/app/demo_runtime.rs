//! Demo playback runtime.
//!
//! Owns one [`Sequencer`] per surface and turns their hook calls into
//! [`DemoUpdate`] messages for the event loop.  Each surface tags its runs
//! with a generation so late messages from a stopped run are dropped, the
//! same way stale background work is discarded elsewhere in the loop.

use tokio::sync::mpsc::UnboundedSender;

use crate::app::state::{ActiveView, AppState, DemoEvent, DemoUpdate, Request, Surface};
use crate::config::PaceConfig;
use crate::core::script::{DemoKind, Script};
use crate::core::sequencer::{Hooks, Sequencer, StartOutcome};

pub struct DemoRuntime {
    terminal: Sequencer,
    modal: Sequencer,
    tx: UnboundedSender<DemoUpdate>,
}

impl DemoRuntime {
    pub fn new(pace: &PaceConfig, tx: UnboundedSender<DemoUpdate>) -> Self {
        let timing = pace.timing();
        Self {
            terminal: Sequencer::new(timing.with_lead_in(pace.lead_in())),
            modal: Sequencer::new(timing),
            tx,
        }
    }

    /// Drain and execute everything the handler queued.
    pub fn apply_requests(&self, state: &mut AppState) {
        for request in std::mem::take(&mut state.requests) {
            self.apply(state, request);
        }
    }

    pub fn apply(&self, state: &mut AppState, request: Request) {
        match request {
            Request::RunDemo(kind) => self.run_terminal(state, kind),
            Request::OpenModal => self.open_modal(state),
            Request::CloseModal => self.close_modal(state),
            Request::StopDemo => self.stop_terminal(state),
        }
    }

    /// Route one hook message to its surface.
    pub fn apply_update(state: &mut AppState, update: DemoUpdate) {
        let DemoUpdate {
            surface,
            generation,
            event,
        } = update;
        let completed = event == DemoEvent::Completed;
        let started_line = matches!(event, DemoEvent::LineStarted(_));
        let applied = state.transcript_mut(surface).apply(generation, event);

        if applied && surface == Surface::Terminal {
            if started_line && state.scroll_offset > 0 {
                // Keep the viewed lines still while new ones arrive below.
                state.scroll_by(1);
            }
            if completed {
                state.status_message = None;
            }
        }
    }

    fn run_terminal(&self, state: &mut AppState, kind: DemoKind) {
        let generation = state.terminal.next_generation();
        let hooks = surface_hooks(Surface::Terminal, generation, self.tx.clone());
        match self.terminal.start(Script::from(kind), hooks) {
            StartOutcome::Started(_) | StartOutcome::Finished => {
                tracing::info!(demo = kind.name(), "demo_run");
                let loading = !self.terminal.timing().lead_in.is_zero();
                state.terminal.begin(generation, kind, loading);
                state.scroll_offset = 0;
                state.status_message = Some(format!("Running `{}`", kind.name()));
            }
            StartOutcome::Rejected => {
                tracing::debug!(demo = kind.name(), "demo_run rejected, already running");
                state.status_message = Some(format!(
                    "A demo is already running ({} to stop it)",
                    state.config.display_bindings(crate::config::Action::Dismiss),
                ));
            }
        }
    }

    fn stop_terminal(&self, state: &mut AppState) {
        if self.terminal.is_running() {
            self.terminal.cancel();
            state.terminal.halt();
            state.status_message = Some("Demo stopped".into());
            tracing::info!("demo_stop");
        }
    }

    /// Open the modal and (re)start the showcase from the top.
    fn open_modal(&self, state: &mut AppState) {
        self.modal.cancel();
        state.modal.halt();
        state.active_view = ActiveView::DemoModal;

        let generation = state.modal.next_generation();
        let hooks = surface_hooks(Surface::Modal, generation, self.tx.clone());
        if let StartOutcome::Started(_) | StartOutcome::Finished =
            self.modal.start(Script::from(DemoKind::Showcase), hooks)
        {
            state.modal.begin(generation, DemoKind::Showcase, false);
        }
        tracing::info!("demo_modal_open");
    }

    fn close_modal(&self, state: &mut AppState) {
        if state.active_view != ActiveView::DemoModal {
            return;
        }
        self.modal.cancel();
        state.modal.halt();
        state.active_view = ActiveView::Terminal;
        state.modal_area = None;
        tracing::info!("demo_modal_close");
    }
}

/// Hooks that forward every sequencer callback to the event loop.
fn surface_hooks(surface: Surface, generation: u64, tx: UnboundedSender<DemoUpdate>) -> Hooks {
    let send = move |event: DemoEvent| {
        // The loop only drops its receiver on shutdown.
        let _ = tx.send(DemoUpdate {
            surface,
            generation,
            event,
        });
    };
    let on_start = send.clone();
    let on_char = send.clone();
    let on_commit = send.clone();

    Hooks::new()
        .on_line_start(move |line| on_start(DemoEvent::LineStarted(line)))
        .on_character(move |text, line| {
            on_char(DemoEvent::Character {
                line,
                text: text.to_string(),
            })
        })
        .on_line_commit(move |_, line| on_commit(DemoEvent::LineCommitted(line)))
        .on_complete(move || send(DemoEvent::Completed))
}
