//! Connection lifecycle and message handling for the fader controller.

use std::time::{Duration, Instant};

use crate::config::HardwareSettings;

use super::HardwareError;
use super::link::{LinkEvent, SerialLink, candidate_ports};
use super::protocol::{DeviceMessage, EncoderDirection, HostCommand, RAW_MAX, parse_line};
use super::sync::{SyncArbiter, TouchDecision, target_for};

/// Playback operations the controller can trigger.
///
/// Every read goes to the live player state at call time.
pub trait PlayerControl {
    /// Current position and duration (zero while unknown).
    fn position(&self) -> (Duration, Duration);
    fn is_playing(&self) -> bool;
    fn seek(&mut self, to: Duration);
    fn set_playing(&mut self, playing: bool);
    fn set_volume(&mut self, volume: f32);
    fn next_track(&mut self);
    fn prev_track(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    /// Fader idle: the host drives it.
    Idle,
    /// Fader under a hand: it drives playback.
    Touching,
}

/// Pollable view of the controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HardwareSnapshot {
    pub state: LinkState,
    pub connected: bool,
    pub port: Option<String>,
    pub fader_position: Option<u16>,
    pub target_position: Option<u16>,
    pub is_touching: bool,
    pub arduino_volume: Option<u16>,
    pub last_encoder_direction: Option<EncoderDirection>,
}

#[derive(Debug, Default)]
pub struct HardwareBridge {
    link: Option<SerialLink>,
    arbiter: SyncArbiter,
    snapshot: HardwareSnapshot,
    unsupported_reported: bool,
}

impl HardwareBridge {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    pub fn snapshot(&self) -> &HardwareSnapshot {
        &self.snapshot
    }

    /// Select and open a controller.
    ///
    /// `Ok(false)` means no connection was made (nothing selected, or the
    /// device could not be opened); that is not reported as an error. The
    /// absence of serial support is reported once.
    pub fn connect(&mut self, settings: &HardwareSettings) -> Result<bool, HardwareError> {
        if self.link.is_some() {
            return Err(HardwareError::AlreadyConnected);
        }
        let port = match &settings.port {
            Some(p) => Some(p.clone()),
            None => match candidate_ports() {
                Ok(ports) => ports.into_iter().next(),
                Err(e) => {
                    if self.unsupported_reported {
                        log::debug!("hardware: {e}");
                        return Ok(false);
                    }
                    self.unsupported_reported = true;
                    return Err(e);
                }
            },
        };

        let Some(port) = port else {
            log::info!("hardware: no serial port found");
            return Ok(false);
        };

        match SerialLink::open(&port) {
            Ok(link) => {
                self.attach(link);
                Ok(true)
            }
            Err(e) => {
                log::warn!("hardware: {e}");
                Ok(false)
            }
        }
    }

    /// Take ownership of an open link. Any previous link is closed first.
    pub fn attach(&mut self, link: SerialLink) {
        if self.link.is_some() {
            self.disconnect();
        }
        self.arbiter.reset();
        self.snapshot = HardwareSnapshot {
            state: LinkState::Idle,
            connected: true,
            port: Some(link.name().to_string()),
            ..HardwareSnapshot::default()
        };
        self.link = Some(link);
    }

    /// Close the link (if any) and return to `Disconnected`.
    pub fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
            log::info!("hardware: disconnected");
        }
        self.arbiter.reset();
        self.snapshot = HardwareSnapshot::default();
    }

    /// Handle everything the reader delivered since the last call, in order.
    pub fn poll(&mut self, now: Instant, player: &mut dyn PlayerControl) {
        loop {
            let Some(event) = self.link.as_ref().and_then(SerialLink::try_recv) else {
                return;
            };
            match event {
                LinkEvent::Line(line) => self.handle_line(&line, now, player),
                LinkEvent::Closed(err) => {
                    match err {
                        Some(e) => log::warn!("hardware: link lost: {e}"),
                        None => log::info!("hardware: device closed the link"),
                    }
                    self.disconnect();
                    return;
                }
            }
        }
    }

    /// Apply one received line. Unknown or malformed lines are dropped.
    pub fn handle_line(&mut self, line: &str, now: Instant, player: &mut dyn PlayerControl) {
        let Some(msg) = parse_line(line) else {
            if !line.trim().is_empty() {
                log::trace!("hardware: ignoring {line:?}");
            }
            return;
        };
        log::debug!("hardware: <- {msg:?}");

        match msg {
            DeviceMessage::Touch(raw) => {
                self.snapshot.state = LinkState::Touching;
                self.snapshot.is_touching = true;
                self.snapshot.fader_position = Some(raw);

                let (_, duration) = player.position();
                let decision = self.arbiter.on_touch(raw, duration, now);
                if let TouchDecision::Seek(to) = decision {
                    log::debug!("hardware: touch seek to {:.2}s", to.as_secs_f64());
                    player.seek(to);
                }
                if decision != TouchDecision::Baseline && !player.is_playing() {
                    player.set_playing(true);
                }
            }
            DeviceMessage::Sync(raw) => {
                self.snapshot.state = LinkState::Idle;
                self.snapshot.is_touching = false;
                self.snapshot.fader_position = Some(raw);
                self.arbiter.on_sync();

                let (position, duration) = player.position();
                if let Some(target) = target_for(position, duration) {
                    self.send_target(target, now);
                }
            }
            DeviceMessage::Volume(raw) => {
                self.snapshot.arduino_volume = Some(raw);
                player.set_volume(f32::from(raw) / f32::from(RAW_MAX));
            }
            DeviceMessage::Encoder(direction) => {
                self.snapshot.last_encoder_direction = Some(direction);
                match direction {
                    EncoderDirection::CounterClockwise => player.prev_track(),
                    EncoderDirection::Clockwise => player.next_track(),
                }
            }
            DeviceMessage::EncoderButton => {
                let playing = player.is_playing();
                player.set_playing(!playing);
            }
        }
    }

    /// Drive the fader to `target`, subject to deduplication and rate
    /// limiting. A write failure tears the connection down.
    pub fn send_target(&mut self, target: u16, now: Instant) {
        if !self
            .arbiter
            .should_send_target(target, self.snapshot.fader_position, now)
        {
            return;
        }
        let Some(link) = self.link.as_mut() else {
            return;
        };
        match link.send(HostCommand::Target(target)) {
            Ok(()) => {
                self.arbiter.record_target(target, now);
                self.snapshot.target_position = Some(target);
            }
            Err(e) => {
                log::warn!("hardware: write failed: {e}");
                self.disconnect();
            }
        }
    }
}

impl Drop for HardwareBridge {
    fn drop(&mut self) {
        self.disconnect();
    }
}
