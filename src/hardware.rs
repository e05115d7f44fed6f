//! Motorized-fader controller bridge.
//!
//! `protocol` frames and parses the serial line protocol, `sync` holds the
//! touch/sync timing rules, `link` owns the serial device and its reader
//! thread, and `bridge` ties them to playback.

mod bridge;
mod link;
mod protocol;
mod sync;

pub use bridge::*;
pub use link::*;
pub use protocol::*;
pub use sync::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("serial ports are not available on this system: {0}")]
    Unsupported(String),
    #[error("a controller is already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
