//! Application module: the presentation model used by the TUI and runtime.
//!
//! `App` holds the cursor, the visualizer mode and the status line, and turns
//! key presses into session commands.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
