use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Opaque, process-unique identifier of a playlist entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(u64);

impl TrackId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One playable entry.
///
/// Everything but `duration` is fixed at creation; `duration` stays zero until
/// metadata resolution succeeds (at scan time or when the decoder opens it).
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub path: PathBuf,
    pub duration: Duration,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            id: TrackId::next(),
            name: name.into(),
            path: path.into(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn has_duration(&self) -> bool {
        !self.duration.is_zero()
    }
}
