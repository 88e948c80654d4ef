//! Application orchestration: state management, input handling, and demo
//! playback.

pub mod demo_runtime;
pub mod event;
pub mod handler;
pub mod state;
