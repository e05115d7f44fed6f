//! Audio-related small types: playback status, repeat policy, equalizer
//! constants and presets, and the error type of the audio subsystem.

use std::time::Duration;

use thiserror::Error;

use crate::config::RepeatSetting;
use crate::library::{LoadError, TrackId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop after the last track.
    #[default]
    None,
    /// Replay the current track when it ends.
    One,
    /// Wrap around to the first track after the last.
    All,
}

impl RepeatMode {
    /// none -> all -> one -> none
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::One => "one",
            Self::All => "all",
        }
    }
}

impl From<RepeatSetting> for RepeatMode {
    fn from(value: RepeatSetting) -> Self {
        match value {
            RepeatSetting::None => Self::None,
            RepeatSetting::One => Self::One,
            RepeatSetting::All => Self::All,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Pollable view of the sequencer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub is_playing: bool,
    pub current_index: Option<usize>,
    pub track: Option<TrackId>,
    pub current_time: Duration,
    /// Zero while unknown.
    pub duration: Duration,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

pub const EQ_BANDS: usize = 10;

/// Center frequencies (Hz) of the equalizer bands.
pub const EQ_FREQUENCIES: [f32; EQ_BANDS] = [
    31.0, 62.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Band gains are limited to +/- this many dB.
pub const EQ_GAIN_LIMIT_DB: f32 = 12.0;

/// Quality factor shared by every band.
pub const EQ_Q: f32 = 1.0;

/// Preset name reported after any manual band edit.
pub const CUSTOM_PRESET: &str = "Custom";

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EqPreset {
    pub name: &'static str,
    pub values: [f32; EQ_BANDS],
}

pub static EQ_PRESETS: [EqPreset; 8] = [
    EqPreset {
        name: "Flat",
        values: [0.0; EQ_BANDS],
    },
    EqPreset {
        name: "Rock",
        values: [5.0, 4.0, 3.0, 1.0, -1.0, -1.0, 0.0, 2.0, 3.0, 4.0],
    },
    EqPreset {
        name: "Pop",
        values: [-2.0, -1.0, 0.0, 2.0, 4.0, 4.0, 2.0, 0.0, -1.0, -2.0],
    },
    EqPreset {
        name: "Jazz",
        values: [4.0, 3.0, 1.0, 2.0, -2.0, -2.0, 0.0, 1.0, 3.0, 4.0],
    },
    EqPreset {
        name: "Classical",
        values: [5.0, 4.0, 3.0, 2.0, -1.0, -1.0, 0.0, 2.0, 3.0, 5.0],
    },
    EqPreset {
        name: "Bass Boost",
        values: [6.0, 5.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    },
    EqPreset {
        name: "Treble",
        values: [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 4.0, 5.0, 6.0],
    },
    EqPreset {
        name: "Vocal",
        values: [-2.0, -3.0, -3.0, 1.0, 4.0, 4.0, 3.0, 1.0, 0.0, -2.0],
    },
];

impl EqPreset {
    /// Look up a built-in preset by name (case-insensitive).
    pub fn find(name: &str) -> Option<&'static EqPreset> {
        let name = name.trim();
        EQ_PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Clamp a requested band gain into the supported range.
pub fn clamp_gain(db: f32) -> f32 {
    if db.is_finite() {
        db.clamp(-EQ_GAIN_LIMIT_DB, EQ_GAIN_LIMIT_DB)
    } else {
        0.0
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("equalizer band {0} out of range")]
    BandOutOfRange(usize),
    #[error("nothing to play")]
    NothingToPlay,
}
