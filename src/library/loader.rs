use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use rodio::decoder::DecoderError;
use rodio::{Decoder, Source};
use thiserror::Error;

use super::model::Track;

/// Decodable source produced by the loader and consumed by the signal graph.
pub type TrackSource = Decoder<BufReader<File>>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecoderError,
    },
}

/// A track opened for playback.
pub struct ResolvedTrack {
    pub source: TrackSource,
    /// Duration reported by the decoder; `None` when the container does not
    /// carry one.
    pub duration: Option<Duration>,
}

impl std::fmt::Debug for ResolvedTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTrack")
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

/// Open and decode `track`.
///
/// Falls back to the duration already known for the track (from tags) when
/// the decoder cannot tell.
pub fn resolve(track: &Track) -> Result<ResolvedTrack, LoadError> {
    let file = File::open(&track.path).map_err(|source| LoadError::Open {
        path: track.path.clone(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|source| LoadError::Decode {
        path: track.path.clone(),
        source,
    })?;

    let duration = source
        .total_duration()
        .filter(|d| !d.is_zero())
        .or_else(|| track.has_duration().then_some(track.duration));

    Ok(ResolvedTrack { source, duration })
}
