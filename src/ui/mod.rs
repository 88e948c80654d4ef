//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the transcripts produced by the demo runtime and turns
//! them into cells on the terminal.  No timers or sequencing happen here.

pub mod layout;
pub mod popup;
pub mod sidebar;
pub mod spinner;
pub mod theme;
pub mod transcript;
