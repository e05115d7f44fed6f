//! Playback sequencer: the Stopped/Playing/Paused state machine over a
//! playlist, with shuffle and repeat policy.
//!
//! The sequencer never talks to the audio device directly; every transition
//! drives a [`MediaOutput`]. Whenever the output refuses (missing device,
//! undecodable file) the sequencer falls back to `Stopped` with nothing bound
//! and returns the error, so it can never report "playing" without a source.

use std::time::Duration;

use crate::library::{Track, TrackId};
use crate::playlist::Playlist;

use super::graph::MediaOutput;
use super::types::{AudioError, PlaybackSnapshot, PlaybackStatus, RepeatMode};

#[derive(Debug, Default)]
pub struct Sequencer {
    playlist: Playlist,
    status: PlaybackStatus,
    /// Track whose source is currently bound to the output.
    bound: Option<TrackId>,
    current_time: Duration,
    duration: Duration,
    shuffle: bool,
    repeat: RepeatMode,
}

impl Sequencer {
    pub fn new(playlist: Playlist, shuffle: bool, repeat: RepeatMode) -> Self {
        let duration = playlist
            .current_track()
            .map(|t| t.duration)
            .unwrap_or_default();
        Self {
            playlist,
            duration,
            shuffle,
            repeat,
            ..Self::default()
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    #[cfg(test)]
    pub fn bound(&self) -> Option<TrackId> {
        self.bound
    }

    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            is_playing: self.is_playing(),
            current_index: self.playlist.current_index(),
            track: self.bound,
            current_time: self.current_time,
            duration: self.duration,
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    fn known_duration_of_current(&self) -> Duration {
        self.playlist
            .current_track()
            .map(|t| t.duration)
            .unwrap_or_default()
    }

    /// Drop back to a safe resting state: nothing bound, not playing.
    fn rest(&mut self, out: &mut dyn MediaOutput) {
        out.stop();
        self.bound = None;
        self.status = PlaybackStatus::Stopped;
        self.current_time = Duration::ZERO;
        self.duration = self.known_duration_of_current();
    }

    fn fail(&mut self, out: &mut dyn MediaOutput, err: AudioError) -> AudioError {
        log::warn!("playback: {err}");
        self.rest(out);
        err
    }

    /// Bind the playlist's current entry to the output, positioned at 0.
    fn bind_current(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        let Some(track) = self.playlist.current_track().cloned() else {
            return Err(self.fail(out, AudioError::NothingToPlay));
        };
        match out.load(&track) {
            Ok(resolved) => {
                self.bound = Some(track.id);
                self.current_time = Duration::ZERO;
                self.duration = match resolved {
                    Some(d) => {
                        self.playlist.set_duration(track.id, d);
                        d
                    }
                    None => track.duration,
                };
                log::debug!("playback: bound {:?}", track.name);
                Ok(())
            }
            Err(e) => Err(self.fail(out, e)),
        }
    }

    fn current_is_bound(&self) -> bool {
        match (self.bound, self.playlist.current_track()) {
            (Some(bound), Some(current)) => bound == current.id,
            _ => false,
        }
    }

    /// Bind the current entry from its start and play it.
    fn start_current(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        self.bind_current(out)?;
        self.resume(out)
    }

    fn resume(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        match out.play() {
            Ok(()) => {
                self.status = PlaybackStatus::Playing;
                Ok(())
            }
            Err(e) => Err(self.fail(out, e)),
        }
    }

    /// Stopped/Paused -> Playing. Binds the current entry when nothing (or a
    /// stale entry) is bound.
    pub fn play(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        if self.playlist.is_empty() {
            return Err(AudioError::NothingToPlay);
        }
        if self.is_playing() && self.current_is_bound() {
            return Ok(());
        }
        if !self.current_is_bound() {
            self.bind_current(out)?;
        }
        self.resume(out)
    }

    pub fn pause(&mut self, out: &mut dyn MediaOutput) {
        if self.is_playing() {
            out.pause();
            self.status = PlaybackStatus::Paused;
        }
    }

    pub fn toggle(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        if self.is_playing() {
            self.pause(out);
            Ok(())
        } else {
            self.play(out)
        }
    }

    pub fn stop(&mut self, out: &mut dyn MediaOutput) {
        self.rest(out);
    }

    /// Seek within the current entry. With nothing bound the current entry
    /// is bound first and left paused.
    pub fn seek(&mut self, out: &mut dyn MediaOutput, pos: Duration) -> Result<(), AudioError> {
        if self.playlist.is_empty() {
            return Err(AudioError::NothingToPlay);
        }
        if !self.current_is_bound() {
            self.bind_current(out)?;
            self.status = PlaybackStatus::Paused;
        }

        let pos = if self.duration.is_zero() {
            pos
        } else {
            pos.min(self.duration)
        };
        out.seek(pos)?;
        self.current_time = pos;
        Ok(())
    }

    /// Jump to `index` and play it.
    pub fn select(&mut self, out: &mut dyn MediaOutput, index: usize) -> Result<(), AudioError> {
        if !self.playlist.select(index) {
            return Err(AudioError::NothingToPlay);
        }
        self.start_current(out)
    }

    /// Move to `index`. Playing continues on the new entry; otherwise the
    /// output is released and the sequencer rests on the new entry.
    fn switch_to(&mut self, out: &mut dyn MediaOutput, index: usize) -> Result<(), AudioError> {
        let was_playing = self.is_playing();
        self.playlist.select(index);
        if was_playing {
            self.start_current(out)
        } else {
            self.rest(out);
            Ok(())
        }
    }

    /// Skip forward: random entry under shuffle, else the linear successor.
    pub fn next(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        match self.playlist.next_index(self.shuffle) {
            Some(i) => self.switch_to(out, i),
            None => Ok(()),
        }
    }

    /// Skip backward: always the linear predecessor, shuffle or not.
    pub fn prev(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        match self.playlist.prev_index() {
            Some(i) => self.switch_to(out, i),
            None => Ok(()),
        }
    }

    /// End-of-media policy.
    pub fn on_ended(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        match self.repeat {
            RepeatMode::One => self.start_current(out),
            RepeatMode::All => match self.playlist.next_index(self.shuffle) {
                Some(i) => {
                    self.playlist.select(i);
                    self.start_current(out)
                }
                None => {
                    self.rest(out);
                    Ok(())
                }
            },
            RepeatMode::None => {
                if self.playlist.is_last() {
                    self.rest(out);
                    return Ok(());
                }
                match self.playlist.next_index(self.shuffle) {
                    Some(i) => {
                        self.playlist.select(i);
                        self.start_current(out)
                    }
                    None => {
                        self.rest(out);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Poll the output: refresh the position and apply the end-of-media
    /// policy when the bound source has played out.
    pub fn tick(&mut self, out: &mut dyn MediaOutput) -> Result<(), AudioError> {
        if !self.is_playing() {
            return Ok(());
        }
        if out.finished() {
            return self.on_ended(out);
        }
        let pos = out.position();
        self.current_time = if self.duration.is_zero() {
            pos
        } else {
            pos.min(self.duration)
        };
        Ok(())
    }

    /// Replace the playlist; playback stops and the pointer goes to the
    /// first entry.
    pub fn set_playlist(&mut self, out: &mut dyn MediaOutput, tracks: Vec<Track>) {
        self.playlist.set_tracks(tracks);
        self.rest(out);
    }

    pub fn add_tracks(&mut self, tracks: Vec<Track>) {
        let was_empty = self.playlist.is_empty();
        self.playlist.add_tracks(tracks);
        if was_empty && self.bound.is_none() {
            self.duration = self.known_duration_of_current();
        }
    }

    /// Remove an entry. Removing the bound entry releases its source; if it
    /// was playing, playback continues with the entry that takes its place.
    pub fn remove_track(
        &mut self,
        out: &mut dyn MediaOutput,
        id: TrackId,
    ) -> Result<Option<Track>, AudioError> {
        let was_bound = self.bound == Some(id);
        let was_playing = self.is_playing();
        let Some(removed) = self.playlist.remove(id) else {
            return Ok(None);
        };

        if was_bound {
            self.rest(out);
            if was_playing && !self.playlist.is_empty() {
                self.start_current(out)?;
            }
        } else if self.bound.is_none() {
            self.duration = self.known_duration_of_current();
        }
        Ok(Some(removed))
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.playlist.reorder(from, to)
    }
}
