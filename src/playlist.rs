//! Ordered track list with a current-entry pointer.
//!
//! Every edit keeps the pointer on the same logical track (by `TrackId`)
//! unless that track itself is removed, in which case the pointer is clamped
//! into range.

use std::time::Duration;

use crate::library::{Track, TrackId};

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: usize,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Index of the current entry; `None` only when the list is empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.tracks.is_empty()).then_some(self.current)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    pub fn is_last(&self) -> bool {
        !self.tracks.is_empty() && self.current + 1 == self.tracks.len()
    }

    /// Replace the whole list; the pointer goes back to the first entry.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.current = 0;
    }

    pub fn add_tracks(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Remove the entry with `id`, returning it.
    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        let index = self.position(id)?;
        let removed = self.tracks.remove(index);

        if index < self.current {
            self.current -= 1;
        }
        self.current = self.current.min(self.tracks.len().saturating_sub(1));
        Some(removed)
    }

    /// Move the entry at `from` so that it ends up at `to`.
    ///
    /// Returns `false` (and leaves the list untouched) when either index is
    /// out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }

        let current_id = self.tracks[self.current].id;
        let moved = self.tracks.remove(from);
        self.tracks.insert(to, moved);
        self.current = self.position(current_id).unwrap_or(0);
        true
    }

    /// Point at `index`; out-of-range indices are rejected.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Record a resolved duration. Returns `false` if the track is gone.
    pub fn set_duration(&mut self, id: TrackId, duration: Duration) -> bool {
        match self.tracks.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.duration = duration;
                true
            }
            None => false,
        }
    }

    /// Successor of the current entry: uniformly random under shuffle,
    /// otherwise the linear successor wrapping to the first entry.
    pub fn next_index(&self, shuffle: bool) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        if shuffle {
            return Some(rand::random_range(0..len));
        }
        Some((self.current + 1) % len)
    }

    /// Linear predecessor of the current entry, wrapping to the last entry.
    /// Shuffle does not apply here.
    pub fn prev_index(&self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        Some(if self.current == 0 {
            len - 1
        } else {
            self.current - 1
        })
    }
}

#[cfg(test)]
mod tests;
