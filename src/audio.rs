//! Audio subsystem: the signal graph (equalizer, gain, analysis tap, output)
//! and the playback sequencer that drives it.

mod analysis;
mod eq;
mod gain;
mod graph;
mod sequencer;
mod types;

pub use analysis::*;
pub use eq::*;
pub use gain::*;
pub use graph::*;
pub use sequencer::*;
pub use types::*;
