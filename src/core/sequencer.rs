//! Typewriter sequencer: reveals a [`Script`] one character at a time.
//!
//! A [`Sequencer`] owns at most one active [`Run`].  `start` hands the run to
//! a Tokio task that loops: take one step of the state machine, fire the
//! matching hook, sleep the delay that step asks for, repeat.  Every step
//! re-checks under the sequencer's lock that its run is still the active one,
//! so `cancel` is a single slot clear (plus an abort of the sleeping task).
//!
//! ```text
//! Idle ─start─▶ Running(l, c) ─▶ Running(l, c+1) ─▶ … ─▶ Running(l+1, 0) ─▶ … ─▶ Done ─▶ Idle
//!                    └────────────────────── cancel ───────────────────────────────────▶ Idle
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use super::script::Script;
use super::timing::TimingConfig;

// ───────────────────────────────────────── hooks ─────────────

type CharacterHook = Box<dyn FnMut(&str, usize) + Send>;
type LineHook = Box<dyn FnMut(usize) + Send>;
type CompleteHook = Box<dyn FnOnce() + Send>;

/// Callbacks a run reports through.  All optional.
///
/// Hooks run on the sequencer's task and must not block.
#[derive(Default)]
pub struct Hooks {
    on_character: Option<CharacterHook>,
    on_line_start: Option<LineHook>,
    on_line_commit: Option<CharacterHook>,
    on_complete: Option<CompleteHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after every character with the accumulated text of the current
    /// line and its index.
    pub fn on_character(mut self, f: impl FnMut(&str, usize) + Send + 'static) -> Self {
        self.on_character = Some(Box::new(f));
        self
    }

    /// Called when a line's buffer is reset, before its first character.
    pub fn on_line_start(mut self, f: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_line_start = Some(Box::new(f));
        self
    }

    /// Called with the finished line, before the inter-line pause.
    pub fn on_line_commit(mut self, f: impl FnMut(&str, usize) + Send + 'static) -> Self {
        self.on_line_commit = Some(Box::new(f));
        self
    }

    /// Called exactly once when the last line completes.  Never called for a
    /// cancelled run.
    pub fn on_complete(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    fn character(&mut self, text: &str, line: usize) {
        if let Some(f) = self.on_character.as_mut() {
            f(text, line);
        }
    }

    fn line_start(&mut self, line: usize) {
        if let Some(f) = self.on_line_start.as_mut() {
            f(line);
        }
    }

    fn line_commit(&mut self, text: &str, line: usize) {
        if let Some(f) = self.on_line_commit.as_mut() {
            f(text, line);
        }
    }

    fn complete(&mut self) {
        if let Some(f) = self.on_complete.take() {
            f();
        }
    }
}

// ───────────────────────────────────────── run ───────────────

/// Identifies one accepted `start` on a given sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

/// What a single step of the state machine did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    /// Buffer reset for line `n`; no delay follows.
    LineStarted(usize),
    /// One character appended to line `n`.
    Character(usize),
    /// Line `n` finished; the line pause follows.
    LineCommitted(usize),
    Done,
}

/// Progress through a script.  Pure state, no timers.
///
/// Invariants: `line <= script.len()`, and while `line < script.len()`,
/// `char_idx <= ` the current line's length in chars.
#[derive(Debug)]
struct Run {
    script: Script,
    line: usize,
    char_idx: usize,
    /// `true` between `LineStarted` and `LineCommitted`.
    line_open: bool,
    buffer: String,
}

impl Run {
    fn new(script: Script) -> Self {
        Self {
            script,
            line: 0,
            char_idx: 0,
            line_open: false,
            buffer: String::new(),
        }
    }

    fn advance(&mut self) -> Tick {
        let Some(current) = self.script.lines().get(self.line) else {
            return Tick::Done;
        };

        if !self.line_open {
            self.line_open = true;
            self.char_idx = 0;
            self.buffer.clear();
            return Tick::LineStarted(self.line);
        }

        match current.chars().nth(self.char_idx) {
            Some(ch) => {
                self.buffer.push(ch);
                self.char_idx += 1;
                Tick::Character(self.line)
            }
            None => {
                let committed = self.line;
                self.line_open = false;
                self.line += 1;
                self.char_idx = 0;
                Tick::LineCommitted(committed)
            }
        }
    }

    fn buffer(&self) -> &str {
        &self.buffer
    }
}

// ───────────────────────────────────────── sequencer ─────────

/// Result of a `start` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A run was scheduled.
    Started(RunId),
    /// The script was empty; `on_complete` already ran.
    Finished,
    /// Another run is active; the request was ignored and its hooks dropped.
    Rejected,
}

/// Snapshot of the sequencer's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running { run: RunId, line: usize, char_idx: usize },
}

struct ActiveRun {
    id: RunId,
    line: usize,
    char_idx: usize,
    task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Slot {
    active: Option<ActiveRun>,
    next_id: u64,
}

/// Paces a script out character by character.  See the module docs.
pub struct Sequencer {
    timing: TimingConfig,
    slot: Arc<Mutex<Slot>>,
}

impl Sequencer {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Begin revealing `script`, reporting through `hooks`.
    ///
    /// Must be called from within a Tokio runtime.  Never fires a hook
    /// synchronously except `on_complete` for an empty script.
    pub fn start(&self, script: impl Into<Script>, mut hooks: Hooks) -> StartOutcome {
        let script = script.into();
        let mut slot = lock(&self.slot);

        if slot.active.is_some() {
            tracing::debug!("sequencer busy, start rejected");
            return StartOutcome::Rejected;
        }

        if script.is_empty() {
            drop(slot);
            hooks.complete();
            return StartOutcome::Finished;
        }

        let id = RunId(slot.next_id);
        slot.next_id = slot.next_id.wrapping_add(1);
        slot.active = Some(ActiveRun {
            id,
            line: 0,
            char_idx: 0,
            task: None,
        });

        tracing::debug!(run = id.0, lines = script.len(), "sequencer run started");
        let task = tokio::spawn(drive(
            Arc::clone(&self.slot),
            id,
            Run::new(script),
            hooks,
            self.timing,
        ));
        if let Some(active) = slot.active.as_mut() {
            active.task = Some(task);
        }

        StartOutcome::Started(id)
    }

    /// Stop the active run, if any, without calling `on_complete`.
    pub fn cancel(&self) {
        let taken = lock(&self.slot).active.take();
        if let Some(active) = taken {
            tracing::debug!(run = active.id.0, "sequencer run cancelled");
            if let Some(task) = active.task {
                task.abort();
            }
        }
    }

    pub fn status(&self) -> Status {
        match &lock(&self.slot).active {
            None => Status::Idle,
            Some(a) => Status::Running {
                run: a.id,
                line: a.line,
                char_idx: a.char_idx,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.slot).active.is_some()
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    // Hooks never run under this lock, so poisoning can only come from a
    // panic inside our own bookkeeping; the slot is still consistent.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The scheduling loop for one run.
async fn drive(
    slot: Arc<Mutex<Slot>>,
    id: RunId,
    mut run: Run,
    mut hooks: Hooks,
    timing: TimingConfig,
) {
    if !timing.lead_in.is_zero() {
        tokio::time::sleep(timing.lead_in).await;
    }

    loop {
        let tick = {
            let mut guard = lock(&slot);
            let Some(active) = guard.active.as_mut().filter(|a| a.id == id) else {
                return;
            };
            let tick = run.advance();
            active.line = run.line;
            active.char_idx = run.char_idx;
            if tick == Tick::Done {
                guard.active = None;
            }
            tick
        };

        match tick {
            Tick::LineStarted(line) => hooks.line_start(line),
            Tick::Character(line) => {
                hooks.character(run.buffer(), line);
                tokio::time::sleep(timing.char_delay()).await;
            }
            Tick::LineCommitted(line) => {
                hooks.line_commit(run.buffer(), line);
                tokio::time::sleep(timing.line_pause).await;
            }
            Tick::Done => {
                tracing::debug!(run = id.0, "sequencer run finished");
                hooks.complete();
                return;
            }
        }
    }
}
