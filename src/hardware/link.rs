//! Serial link to the controller.
//!
//! Reads happen on a dedicated thread that frames bytes into lines and hands
//! them to the owner over a channel, in arrival order. Writes happen on the
//! owner's thread. The reader polls a shutdown flag between bounded-timeout
//! reads, so `close` can cancel it synchronously.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use serialport::SerialPortType;

use super::HardwareError;
use super::protocol::{HostCommand, LineFramer};

/// Line rate used for every controller.
pub const BAUD_RATE: u32 = 115_200;

/// Upper bound for one blocking read; also the shutdown latency.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum LinkEvent {
    Line(String),
    /// The device went away (end of stream or read error).
    Closed(Option<io::Error>),
}

pub struct SerialLink {
    name: String,
    writer: Option<Box<dyn Write + Send>>,
    events: Receiver<LinkEvent>,
    shutdown: Arc<AtomicBool>,
    reader: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("name", &self.name)
            .field("open", &self.writer.is_some())
            .finish_non_exhaustive()
    }
}

impl SerialLink {
    /// Open `path` at [`BAUD_RATE`].
    pub fn open(path: &str) -> Result<Self, HardwareError> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| HardwareError::Open {
                port: path.to_string(),
                source,
            })?;
        let reader = port.try_clone().map_err(|source| HardwareError::Open {
            port: path.to_string(),
            source,
        })?;
        Self::from_parts(path, reader, port)
    }

    /// Build a link over any byte stream pair.
    ///
    /// `reader` should return `TimedOut`/`WouldBlock` when idle so the reader
    /// thread can observe shutdown.
    pub fn from_parts<R, W>(name: &str, reader: R, writer: W) -> Result<Self, HardwareError>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let thread_name = name.to_string();

        let handle = thread::Builder::new()
            .name(format!("serial-read-{name}"))
            .spawn(move || read_loop(reader, tx, shutdown_clone, &thread_name))?;

        log::info!("[serial {name}] connected at {BAUD_RATE} baud");
        Ok(Self {
            name: name.to_string(),
            writer: Some(Box::new(writer)),
            events: rx,
            shutdown,
            reader: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn send(&mut self, cmd: HostCommand) -> Result<(), HardwareError> {
        let writer = self.writer.as_mut().ok_or(HardwareError::NotConnected)?;
        let line = cmd.encode();
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        log::debug!("[serial {}] -> {}", self.name, line.trim_end());
        Ok(())
    }

    /// Next event from the reader thread, without blocking.
    pub fn try_recv(&self) -> Option<LinkEvent> {
        match self.events.try_recv() {
            Ok(ev) => Some(ev),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.writer.is_some() {
                    Some(LinkEvent::Closed(None))
                } else {
                    None
                }
            }
        }
    }

    /// Tear down in order: stop the reader, release the writer, drop the
    /// device. A failing step is logged and the next one still runs.
    pub fn close(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.reader.take() {
            log::debug!("[serial {}] waiting for reader to stop", self.name);
            if handle.join().is_err() {
                log::warn!("[serial {}] reader thread panicked", self.name);
            }
        }

        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                log::warn!("[serial {}] flush on close failed: {e}", self.name);
            }
            drop(writer);
            log::info!("[serial {}] closed", self.name);
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_loop<R: Read>(mut reader: R, tx: Sender<LinkEvent>, shutdown: Arc<AtomicBool>, name: &str) {
    log::debug!("[serial {name}] reader started");
    let mut framer = LineFramer::new();
    let mut buf = [0u8; 256];

    while !shutdown.load(Ordering::Relaxed) {
        match reader.read(&mut buf) {
            Ok(0) => {
                let _ = tx.send(LinkEvent::Closed(None));
                break;
            }
            Ok(n) => {
                for line in framer.push(&buf[..n]) {
                    if tx.send(LinkEvent::Line(line)).is_err() {
                        return;
                    }
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                log::warn!("[serial {name}] read error: {e}");
                let _ = tx.send(LinkEvent::Closed(Some(e)));
                break;
            }
        }
    }
    log::debug!("[serial {name}] reader stopped");
}

/// Serial ports worth offering, USB adapters first.
pub fn candidate_ports() -> Result<Vec<String>, HardwareError> {
    let mut ports = serialport::available_ports()
        .map_err(|e| HardwareError::Unsupported(e.to_string()))?;
    ports.sort_by_key(|p| !matches!(p.port_type, SerialPortType::UsbPort(_)));
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
