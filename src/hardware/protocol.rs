//! Line protocol spoken with the fader controller.
//!
//! Every message is one ASCII line, `KEY:VALUE` or a bare `KEY`:
//!
//! | line              | direction     |
//! |-------------------|---------------|
//! | `TOUCH:<0-1023>`  | device -> host |
//! | `SYNC:<0-1023>`   | device -> host |
//! | `VOLUME:<0-1023>` | device -> host |
//! | `ENCODER:CW/CCW`  | device -> host |
//! | `ENCODER_BTN`     | device -> host |
//! | `TARGET:<0-1023>` | host -> device |

/// Largest raw value of a fader or potentiometer reading.
pub const RAW_MAX: u16 = 1023;

/// A partial line longer than this is discarded.
pub const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EncoderDirection {
    Clockwise,
    CounterClockwise,
}

impl EncoderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clockwise => "CW",
            Self::CounterClockwise => "CCW",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    Touch(u16),
    Sync(u16),
    Volume(u16),
    Encoder(EncoderDirection),
    EncoderButton,
}

fn parse_raw(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().map(|v| v.min(RAW_MAX))
}

/// Parse one complete line. Unknown keys and malformed values yield `None`.
pub fn parse_line(line: &str) -> Option<DeviceMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line == "ENCODER_BTN" {
        return Some(DeviceMessage::EncoderButton);
    }

    let (key, value) = line.split_once(':')?;
    match key.trim() {
        "TOUCH" => parse_raw(value).map(DeviceMessage::Touch),
        "SYNC" => parse_raw(value).map(DeviceMessage::Sync),
        "VOLUME" => parse_raw(value).map(DeviceMessage::Volume),
        "ENCODER" => {
            // "CCW" contains "CW": test the longer token first.
            let value = value.trim();
            if value.contains("CCW") {
                Some(DeviceMessage::Encoder(EncoderDirection::CounterClockwise))
            } else if value.contains("CW") {
                Some(DeviceMessage::Encoder(EncoderDirection::Clockwise))
            } else {
                None
            }
        }
        _ => None,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Target(u16),
}

impl HostCommand {
    /// Wire form, newline included.
    pub fn encode(self) -> String {
        match self {
            Self::Target(v) => format!("TARGET:{}\n", v.min(RAW_MAX)),
        }
    }
}

/// Reassembles newline-terminated lines from arbitrarily split reads.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
    /// Inside an oversized line; everything up to the next newline is dropped.
    discarding: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns every line completed by them, in order.
    /// A trailing fragment is kept for the next call.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &b in bytes {
            if b == b'\n' {
                let raw = std::mem::take(&mut self.pending);
                if std::mem::take(&mut self.discarding) {
                    continue;
                }
                let line = String::from_utf8_lossy(&raw);
                lines.push(line.trim_end_matches('\r').to_string());
            } else if self.discarding {
                continue;
            } else if self.pending.len() < MAX_LINE_LEN {
                self.pending.push(b);
            } else {
                log::trace!("hardware: dropping oversized line");
                self.pending.clear();
                self.discarding = true;
            }
        }
        lines
    }

    /// Bytes received since the last newline.
    #[cfg(test)]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}
