//! Presentation model: cursor positions and view toggles, plus the mapping
//! from key presses to session commands.

use crossterm::event::KeyCode;

use crate::audio::{EQ_BANDS, EQ_PRESETS};
use crate::session::{Command, Session};

/// Seconds skipped by `H`/`L`.
pub const SCRUB_SECONDS: i64 = 5;
const VOLUME_STEP: f32 = 0.05;
const BAND_STEP_DB: f32 = 1.0;

/// What the visualizer panel draws from the analysis tap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Visualizer {
    #[default]
    Waveform,
    Spectrum,
}

impl Visualizer {
    pub fn toggle(self) -> Self {
        match self {
            Self::Waveform => Self::Spectrum,
            Self::Spectrum => Self::Waveform,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Waveform => "oscilloscope",
            Self::Spectrum => "spectrum",
        }
    }
}

/// Result of a key press.
#[derive(Debug)]
pub enum Action {
    Quit,
    Dispatch(Command),
    /// Handled locally (cursor movement, view toggles).
    Redraw,
    Ignored,
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    /// Playlist row under the cursor.
    pub selected: usize,
    /// Equalizer band under the cursor.
    pub band: usize,
    /// Index into `EQ_PRESETS` of the last preset applied with `p`.
    preset_cursor: Option<usize>,
    pub visualizer: Visualizer,
    status: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line message shown in the status panel (last error, connect result).
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Keep the cursor inside a playlist of `len` rows.
    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len > 0 {
            self.selected = if self.selected == 0 {
                len - 1
            } else {
                self.selected - 1
            };
        }
    }

    pub fn next_band(&mut self) {
        self.band = (self.band + 1).min(EQ_BANDS - 1);
    }

    pub fn prev_band(&mut self) {
        self.band = self.band.saturating_sub(1);
    }

    fn next_preset(&mut self) -> usize {
        let i = self
            .preset_cursor
            .map(|i| (i + 1) % EQ_PRESETS.len())
            .unwrap_or(0);
        self.preset_cursor = Some(i);
        i
    }

    /// Translate a key press into an action against `session`.
    pub fn handle_key(&mut self, code: KeyCode, session: &Session) -> Action {
        let len = session.playlist().len();
        self.clamp_selection(len);

        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,

            KeyCode::Char(' ') => Action::Dispatch(Command::TogglePlay),
            KeyCode::Char('s') => Action::Dispatch(Command::Stop),
            KeyCode::Enter if len > 0 => Action::Dispatch(Command::Select(self.selected)),
            KeyCode::Char('h') => Action::Dispatch(Command::Prev),
            KeyCode::Char('l') => Action::Dispatch(Command::Next),
            KeyCode::Char('H') | KeyCode::Left => Action::Dispatch(Command::SeekBy(-SCRUB_SECONDS)),
            KeyCode::Char('L') | KeyCode::Right => Action::Dispatch(Command::SeekBy(SCRUB_SECONDS)),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                Action::Dispatch(Command::SetVolume(session.volume() + VOLUME_STEP))
            }
            KeyCode::Char('-') => Action::Dispatch(Command::SetVolume(session.volume() - VOLUME_STEP)),
            KeyCode::Char('z') => Action::Dispatch(Command::ToggleShuffle),
            KeyCode::Char('r') => Action::Dispatch(Command::CycleRepeat),

            KeyCode::Char('j') | KeyCode::Down => {
                self.next(len);
                Action::Redraw
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.prev(len);
                Action::Redraw
            }
            KeyCode::Char('J') if self.selected + 1 < len => {
                let from = self.selected;
                self.selected += 1;
                Action::Dispatch(Command::Reorder {
                    from,
                    to: from + 1,
                })
            }
            KeyCode::Char('K') if self.selected > 0 && len > 0 => {
                let from = self.selected;
                self.selected -= 1;
                Action::Dispatch(Command::Reorder {
                    from,
                    to: from - 1,
                })
            }
            KeyCode::Char('d') => match session.playlist().get(self.selected) {
                Some(track) => Action::Dispatch(Command::RemoveTrack(track.id)),
                None => Action::Ignored,
            },

            KeyCode::Char('e') => {
                Action::Dispatch(Command::SetEqEnabled(!session.equalizer().enabled()))
            }
            KeyCode::Char('[') => {
                self.prev_band();
                Action::Redraw
            }
            KeyCode::Char(']') => {
                self.next_band();
                Action::Redraw
            }
            KeyCode::Char('{') => self.nudge_band(session, -BAND_STEP_DB),
            KeyCode::Char('}') => self.nudge_band(session, BAND_STEP_DB),
            KeyCode::Char('p') => {
                let i = self.next_preset();
                Action::Dispatch(Command::ApplyPreset(&EQ_PRESETS[i]))
            }

            KeyCode::Char('v') => {
                self.visualizer = self.visualizer.toggle();
                Action::Redraw
            }
            KeyCode::Char('c') => {
                if session.hardware().connected {
                    Action::Dispatch(Command::DisconnectHardware)
                } else {
                    Action::Dispatch(Command::ConnectHardware)
                }
            }
            _ => Action::Ignored,
        }
    }

    fn nudge_band(&self, session: &Session, delta: f32) -> Action {
        let db = session.equalizer().bands()[self.band] + delta;
        Action::Dispatch(Command::SetBandGain {
            band: self.band,
            db,
        })
    }
}
