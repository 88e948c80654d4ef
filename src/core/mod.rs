//! Core logic – the typewriter sequencer, its pacing, scripts, and rate gates.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod rate;
pub mod script;
pub mod sequencer;
pub mod timing;
