//! Session controller: the one owner of the signal graph, the sequencer and
//! the hardware bridge, and the command surface the presentation talks to.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::audio::{
    AudioError, EQ_BANDS, EqPreset, EqualizerState, PlaybackSnapshot, RepeatMode, Sequencer,
    SignalGraph,
};
use crate::config::{HardwareSettings, LibrarySettings, Settings};
use crate::hardware::{HardwareBridge, HardwareError, HardwareSnapshot, PlayerControl};
use crate::library::{self, Track, TrackId};
use crate::playlist::Playlist;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

#[derive(Debug, Clone)]
pub enum Command {
    Play,
    Pause,
    Stop,
    TogglePlay,
    Seek(Duration),
    /// Relative seek in seconds, clamped at the track start.
    SeekBy(i64),
    SetVolume(f32),
    SetBandGain { band: usize, db: f32 },
    SetEqEnabled(bool),
    ApplyPreset(&'static EqPreset),
    SetEqValues([f32; EQ_BANDS]),
    Next,
    Prev,
    ToggleShuffle,
    CycleRepeat,
    Select(usize),
    RemoveTrack(TrackId),
    Reorder { from: usize, to: usize },
    SetPlaylist(Vec<Track>),
    AddTracks(Vec<Track>),
    /// Scan files and folders and append what they contain.
    AddPaths(Vec<PathBuf>),
    ConnectHardware,
    DisconnectHardware,
}

/// Graph plus sequencer; what the hardware bridge controls.
pub struct Player {
    graph: SignalGraph,
    sequencer: Sequencer,
}

impl Player {
    fn report(result: Result<(), AudioError>) {
        if let Err(e) = result {
            log::warn!("hardware command failed: {e}");
        }
    }
}

impl PlayerControl for Player {
    fn position(&self) -> (Duration, Duration) {
        (self.sequencer.current_time(), self.sequencer.duration())
    }

    fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    fn seek(&mut self, to: Duration) {
        Self::report(self.sequencer.seek(&mut self.graph, to));
    }

    fn set_playing(&mut self, playing: bool) {
        if playing {
            Self::report(self.sequencer.play(&mut self.graph));
        } else {
            self.sequencer.pause(&mut self.graph);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.graph.set_volume(volume);
    }

    fn next_track(&mut self) {
        Self::report(self.sequencer.next(&mut self.graph));
    }

    fn prev_track(&mut self) {
        Self::report(self.sequencer.prev(&mut self.graph));
    }
}

pub struct Session {
    player: Player,
    hardware: HardwareBridge,
    hardware_settings: HardwareSettings,
    library_settings: LibrarySettings,
}

impl Session {
    pub fn new(settings: &Settings, tracks: Vec<Track>) -> Self {
        let mut graph = SignalGraph::new(&settings.audio, &settings.equalizer);
        // May be refused now; retried on first load/play.
        graph.initialize();

        let sequencer = Sequencer::new(
            Playlist::new(tracks),
            settings.playback.shuffle,
            RepeatMode::from(settings.playback.repeat),
        );

        Self {
            player: Player { graph, sequencer },
            hardware: HardwareBridge::new(),
            hardware_settings: settings.hardware.clone(),
            library_settings: settings.library.clone(),
        }
    }

    pub fn dispatch(&mut self, cmd: Command) -> Result<(), SessionError> {
        let Player { graph, sequencer } = &mut self.player;
        match cmd {
            Command::Play => sequencer.play(graph)?,
            Command::Pause => sequencer.pause(graph),
            Command::Stop => sequencer.stop(graph),
            Command::TogglePlay => sequencer.toggle(graph)?,
            Command::Seek(to) => sequencer.seek(graph, to)?,
            Command::SeekBy(delta) => {
                let now = sequencer.current_time();
                let step = Duration::from_secs(delta.unsigned_abs());
                let to = if delta >= 0 {
                    now + step
                } else {
                    now.saturating_sub(step)
                };
                sequencer.seek(graph, to)?;
            }
            Command::SetVolume(v) => graph.set_volume(v),
            Command::SetBandGain { band, db } => graph.set_band_gain(band, db)?,
            Command::SetEqEnabled(enabled) => graph.set_equalizer_enabled(enabled),
            Command::ApplyPreset(preset) => graph.apply_preset(preset),
            Command::SetEqValues(values) => graph.set_band_values(values),
            Command::Next => sequencer.next(graph)?,
            Command::Prev => sequencer.prev(graph)?,
            Command::ToggleShuffle => {
                sequencer.toggle_shuffle();
            }
            Command::CycleRepeat => {
                sequencer.cycle_repeat();
            }
            Command::Select(index) => sequencer.select(graph, index)?,
            Command::RemoveTrack(id) => {
                sequencer.remove_track(graph, id)?;
            }
            Command::Reorder { from, to } => {
                sequencer.reorder(from, to);
            }
            Command::SetPlaylist(tracks) => sequencer.set_playlist(graph, tracks),
            Command::AddTracks(tracks) => sequencer.add_tracks(tracks),
            Command::AddPaths(paths) => {
                let tracks = library::collect(&paths, &self.library_settings);
                log::info!("library: added {} tracks", tracks.len());
                sequencer.add_tracks(tracks);
            }
            Command::ConnectHardware => {
                self.hardware.connect(&self.hardware_settings)?;
            }
            Command::DisconnectHardware => self.hardware.disconnect(),
        }
        Ok(())
    }

    /// Advance time: refresh playback position, apply end-of-media policy,
    /// then handle whatever the controller sent.
    pub fn tick(&mut self, now: Instant) -> Result<(), SessionError> {
        let playback = self.player.sequencer.tick(&mut self.player.graph);
        self.hardware.poll(now, &mut self.player);
        playback.map_err(SessionError::from)
    }

    pub fn playback(&self) -> PlaybackSnapshot {
        self.player.sequencer.snapshot()
    }

    pub fn playlist(&self) -> &Playlist {
        self.player.sequencer.playlist()
    }

    pub fn hardware(&self) -> &HardwareSnapshot {
        self.hardware.snapshot()
    }

    pub fn equalizer(&self) -> &EqualizerState {
        self.player.graph.equalizer()
    }

    pub fn volume(&self) -> f32 {
        self.player.graph.volume()
    }

    pub fn sample_analysis(&self) -> Vec<u8> {
        self.player.graph.sample_analysis()
    }

    pub fn sample_spectrum(&self) -> Vec<u8> {
        self.player.graph.sample_spectrum()
    }

    /// Release the controller and the output device.
    pub fn shutdown(&mut self) {
        self.hardware.disconnect();
        self.player.sequencer.stop(&mut self.player.graph);
        self.player.graph.close();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests;
