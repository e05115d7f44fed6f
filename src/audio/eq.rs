//! Ten-band graphic equalizer.
//!
//! `EqualizerState` is the user-facing model (stored gains, enabled flag,
//! preset name). `EqBank` carries the *applied* gains to the mixer thread,
//! where `EqChain` runs one biquad cascade per channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use biquad::{Biquad as _, Coefficients, DirectForm1, ToHertz, Type};
use rodio::source::SeekError;
use rodio::{ChannelCount, Sample, SampleRate, Source};

use super::types::{
    AudioError, CUSTOM_PRESET, EQ_BANDS, EQ_FREQUENCIES, EQ_Q, EqPreset, clamp_gain,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EqualizerState {
    bands: [f32; EQ_BANDS],
    enabled: bool,
    preset: String,
}

impl Default for EqualizerState {
    fn default() -> Self {
        Self {
            bands: [0.0; EQ_BANDS],
            enabled: true,
            preset: "Flat".to_string(),
        }
    }
}

impl EqualizerState {
    pub fn bands(&self) -> &[f32; EQ_BANDS] {
        &self.bands
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn preset(&self) -> &str {
        &self.preset
    }

    /// Gains the filters must actually use: the stored bands, or all zero
    /// while the equalizer is disabled.
    pub fn applied(&self) -> [f32; EQ_BANDS] {
        if self.enabled {
            self.bands
        } else {
            [0.0; EQ_BANDS]
        }
    }

    pub fn set_band(&mut self, index: usize, db: f32) -> Result<(), AudioError> {
        let slot = self
            .bands
            .get_mut(index)
            .ok_or(AudioError::BandOutOfRange(index))?;
        *slot = clamp_gain(db);
        self.preset = CUSTOM_PRESET.to_string();
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn apply_preset(&mut self, preset: &EqPreset) {
        self.bands = preset.values.map(clamp_gain);
        self.preset = preset.name.to_string();
    }

    /// Store an arbitrary gain vector. It is named after the matching
    /// built-in preset when there is one, "Custom" otherwise.
    pub fn set_values(&mut self, values: [f32; EQ_BANDS]) {
        self.bands = values.map(clamp_gain);
        self.preset = super::types::EQ_PRESETS
            .iter()
            .find(|p| p.values == self.bands)
            .map(|p| p.name)
            .unwrap_or(CUSTOM_PRESET)
            .to_string();
    }
}

/// Applied gains shared with the mixer thread.
///
/// Writers bump `version` after updating `gains`; readers only take the lock
/// when the version moved.
#[derive(Debug, Default)]
pub struct EqBank {
    gains: Mutex<[f32; EQ_BANDS]>,
    version: AtomicU64,
}

impl EqBank {
    pub fn new(gains: [f32; EQ_BANDS]) -> Arc<Self> {
        Arc::new(Self {
            gains: Mutex::new(gains),
            version: AtomicU64::new(0),
        })
    }

    pub fn store(&self, gains: [f32; EQ_BANDS]) {
        match self.gains.lock() {
            Ok(mut g) => *g = gains,
            Err(poisoned) => *poisoned.into_inner() = gains,
        }
        self.version.fetch_add(1, Ordering::Release);
    }

    pub fn load(&self) -> [f32; EQ_BANDS] {
        match self.gains.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

const PASSTHROUGH: Coefficients<f32> = Coefficients {
    a1: 0.0,
    a2: 0.0,
    b0: 1.0,
    b1: 0.0,
    b2: 0.0,
};

/// Coefficients for band `index` at `gain_db`.
///
/// The first band is a low shelf, the last a high shelf, the rest peaking
/// filters. Center frequencies above the usable range of the stream are
/// pulled below Nyquist.
pub fn band_coefficients(index: usize, gain_db: f32, sample_rate: f32) -> Coefficients<f32> {
    let f0 = EQ_FREQUENCIES[index].min(sample_rate * 0.45);
    let kind = match index {
        0 => Type::LowShelf(gain_db),
        i if i == EQ_BANDS - 1 => Type::HighShelf(gain_db),
        _ => Type::PeakingEQ(gain_db),
    };
    match Coefficients::<f32>::from_params(kind, sample_rate.hz(), f0.hz(), EQ_Q) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("eq: band {index} at {sample_rate} Hz rejected: {e:?}");
            PASSTHROUGH
        }
    }
}

type Cascade = [DirectForm1<f32>; EQ_BANDS];

fn build_cascade(gains: &[f32; EQ_BANDS], sample_rate: f32) -> Cascade {
    std::array::from_fn(|i| DirectForm1::<f32>::new(band_coefficients(i, gains[i], sample_rate)))
}

/// A rodio source running every sample through the ten band filters.
pub struct EqChain<S: Source> {
    inner: S,
    bank: Arc<EqBank>,
    seen_version: u64,
    gains: [f32; EQ_BANDS],
    channels: ChannelCount,
    sample_rate: SampleRate,
    cascades: Vec<Cascade>,
    channel: usize,
}

impl<S: Source> EqChain<S> {
    pub fn new(inner: S, bank: Arc<EqBank>) -> Self {
        let seen_version = bank.version();
        let gains = bank.load();
        let channels = inner.channels();
        let sample_rate = inner.sample_rate();
        let mut chain = Self {
            inner,
            bank,
            seen_version,
            gains,
            channels,
            sample_rate,
            cascades: Vec::new(),
            channel: 0,
        };
        chain.rebuild();
        chain
    }

    fn rebuild(&mut self) {
        let fs = self.sample_rate.max(1) as f32;
        self.cascades = (0..self.channels.max(1))
            .map(|_| build_cascade(&self.gains, fs))
            .collect();
        self.channel = 0;
    }

    fn refresh_gains(&mut self) {
        let version = self.bank.version();
        if version == self.seen_version {
            return;
        }
        // Never block the mixer thread; retry on the next frame.
        let Ok(gains) = self.bank.gains.try_lock().map(|g| *g) else {
            return;
        };
        self.seen_version = version;
        if gains == self.gains {
            return;
        }
        self.gains = gains;

        let fs = self.sample_rate.max(1) as f32;
        for cascade in &mut self.cascades {
            for (i, filter) in cascade.iter_mut().enumerate() {
                filter.update_coefficients(band_coefficients(i, gains[i], fs));
            }
        }
    }

    /// Called at frame boundaries: pick up format and gain changes.
    fn on_frame_start(&mut self) {
        let channels = self.inner.channels();
        let sample_rate = self.inner.sample_rate();
        if channels != self.channels || sample_rate != self.sample_rate {
            self.channels = channels;
            self.sample_rate = sample_rate;
            self.rebuild();
        }
        self.refresh_gains();
    }
}

impl<S: Source> Iterator for EqChain<S> {
    type Item = Sample;

    #[inline]
    fn next(&mut self) -> Option<Sample> {
        if self.channel == 0 {
            self.on_frame_start();
        }
        let sample = self.inner.next()?;

        let idx = self.channel.min(self.cascades.len().saturating_sub(1));
        let mut out = sample;
        if let Some(cascade) = self.cascades.get_mut(idx) {
            for filter in cascade.iter_mut() {
                out = filter.run(out);
            }
        }
        if !out.is_finite() {
            out = 0.0;
        }

        self.channel += 1;
        if self.channel >= usize::from(self.channels.max(1)) {
            self.channel = 0;
        }
        Some(out)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for EqChain<S> {
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
        // Filter state from the old position would ring into the new one.
        self.rebuild();
        Ok(())
    }
}
