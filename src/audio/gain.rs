//! Master gain stage sitting between the equalizer and the analysis tap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rodio::source::SeekError;
use rodio::{ChannelCount, Sample, SampleRate, Source};

/// Shared linear gain in `[0, 1]`, stored as `f32` bits.
#[derive(Debug, Clone)]
pub struct GainControl(Arc<AtomicU32>);

impl GainControl {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(clamp_volume(value).to_bits())))
    }

    pub fn set(&self, value: f32) {
        self.0.store(clamp_volume(value).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

pub fn clamp_volume(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Multiplies every sample by the current gain; a new value applies from
/// the next sample on.
pub struct GainStage<S: Source> {
    inner: S,
    gain: GainControl,
}

impl<S: Source> GainStage<S> {
    pub fn new(inner: S, gain: GainControl) -> Self {
        Self { inner, gain }
    }
}

impl<S: Source> Iterator for GainStage<S> {
    type Item = Sample;

    #[inline]
    fn next(&mut self) -> Option<Sample> {
        self.inner.next().map(|s| s * self.gain.get())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for GainStage<S> {
    #[inline]
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    #[inline]
    fn channels(&self) -> ChannelCount {
        self.inner.channels()
    }

    #[inline]
    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    #[inline]
    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.inner.try_seek(pos)
    }
}
