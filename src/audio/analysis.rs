//! Analysis tap: a pass-through source that publishes the most recent block
//! of (mono-mixed) samples for the visualizer, plus pull-based accessors that
//! turn that block into byte waveforms and byte spectra.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::source::SeekError;
use rodio::{ChannelCount, Sample, SampleRate, Source};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Spectrum magnitudes are mapped from this dB range onto `0..=255`.
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

struct SpectrumPlan {
    size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

/// Latest analysis block shared between the tap (writer, mixer thread) and
/// the presentation (reader).
pub struct AnalysisBuffer {
    size: usize,
    latest: Mutex<Vec<f32>>,
    plan: Mutex<Option<SpectrumPlan>>,
}

impl std::fmt::Debug for AnalysisBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisBuffer")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl AnalysisBuffer {
    pub fn new(size: usize) -> Arc<Self> {
        Arc::new(Self {
            size: size.max(2),
            latest: Mutex::new(Vec::new()),
            plan: Mutex::new(None),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Replace the published block. Skipped when a reader holds the lock.
    fn publish(&self, block: &[f32]) {
        if let Ok(mut latest) = self.latest.try_lock() {
            latest.clear();
            latest.extend_from_slice(block);
        }
    }

    /// Forget the published block (no source, stop, track change).
    pub fn clear(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            latest.clear();
        }
    }

    fn snapshot(&self) -> Vec<f32> {
        self.latest.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Time-domain samples as unsigned bytes centered on 128, or empty when
    /// nothing has been published.
    pub fn waveform(&self) -> Vec<u8> {
        self.snapshot()
            .iter()
            .map(|s| (128.0 + s * 128.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    /// Magnitude spectrum of the block as `size / 2` byte bins, or empty when
    /// nothing has been published.
    pub fn spectrum(&self) -> Vec<u8> {
        let block = self.snapshot();
        if block.is_empty() {
            return Vec::new();
        }

        let Ok(mut plan_slot) = self.plan.lock() else {
            return Vec::new();
        };
        if plan_slot.as_ref().is_none_or(|p| p.size != block.len()) {
            *plan_slot = Some(make_plan(block.len()));
        }
        let Some(plan) = plan_slot.as_ref() else {
            return Vec::new();
        };

        let n = plan.size;
        let mut buf: Vec<Complex<f32>> = block
            .iter()
            .zip(&plan.window)
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();
        plan.fft.process(&mut buf);

        buf.iter()
            .take(n / 2)
            .map(|c| {
                let mag = c.norm() / n as f32;
                let db = 20.0 * mag.max(1e-12).log10();
                let t = (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
                (t.clamp(0.0, 1.0) * 255.0).round() as u8
            })
            .collect()
    }
}

fn make_plan(size: usize) -> SpectrumPlan {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(size);
    let window = (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos())
        .collect();
    SpectrumPlan { size, fft, window }
}

/// Pass-through source feeding an `AnalysisBuffer`.
pub struct AnalysisTap<S: Source> {
    inner: S,
    buffer: Arc<AnalysisBuffer>,
    block: Vec<f32>,
    frame_sum: f32,
    channel: usize,
}

impl<S: Source> AnalysisTap<S> {
    pub fn new(inner: S, buffer: Arc<AnalysisBuffer>) -> Self {
        let block = Vec::with_capacity(buffer.size());
        Self {
            inner,
            buffer,
            block,
            frame_sum: 0.0,
            channel: 0,
        }
    }
}

impl<S: Source> Iterator for AnalysisTap<S> {
    type Item = Sample;

    #[inline]
    fn next(&mut self) -> Option<Sample> {
        let sample = self.inner.next()?;

        let channels = usize::from(self.inner.channels().max(1));
        self.frame_sum += sample;
        self.channel += 1;
        if self.channel >= channels {
            self.block.push(self.frame_sum / channels as f32);
            self.frame_sum = 0.0;
            self.channel = 0;
            if self.block.len() >= self.buffer.size() {
                self.buffer.publish(&self.block);
                self.block.clear();
            }
        }
        Some(sample)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for AnalysisTap<S> {
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
        self.inner.try_seek(pos)?;
        self.block.clear();
        self.frame_sum = 0.0;
        self.channel = 0;
        Ok(())
    }
}
