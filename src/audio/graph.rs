//! Signal graph: source -> 10 band filters -> gain -> analysis tap -> output.
//!
//! The graph owns the output stream and at most one bound source (wrapped in
//! its own `Sink`). Parameters live outside the sample path (`EqBank`,
//! `GainControl`, `AnalysisBuffer`) so every newly bound source is wired to
//! the same controls.

use std::sync::Arc;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use crate::config::{AudioSettings, EqualizerSettings};
use crate::library::{self, Track};

use super::analysis::{AnalysisBuffer, AnalysisTap};
use super::eq::{EqBank, EqChain, EqualizerState};
use super::gain::{GainControl, GainStage};
use super::types::{AudioError, EQ_BANDS, EqPreset};

/// What the sequencer needs from an audio output.
pub trait MediaOutput {
    /// Bind `track` as the current source, paused at its start. Any
    /// previously bound source is released first. Returns the duration when
    /// known.
    fn load(&mut self, track: &Track) -> Result<Option<Duration>, AudioError>;
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    /// Release the bound source.
    fn stop(&mut self);
    fn seek(&mut self, pos: Duration) -> Result<(), AudioError>;
    /// Decoder position of the bound source.
    fn position(&self) -> Duration;
    /// The bound source has played out.
    fn finished(&self) -> bool;
}

pub struct SignalGraph {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    loaded: Option<Track>,
    /// Added to the sink position after a seek that had to rebuild the source.
    position_offset: Duration,
    eq: EqualizerState,
    bank: Arc<EqBank>,
    gain: GainControl,
    analysis: Arc<AnalysisBuffer>,
}

impl SignalGraph {
    /// Create the graph controls. No audio device is touched until
    /// [`SignalGraph::initialize`].
    pub fn new(audio: &AudioSettings, equalizer: &EqualizerSettings) -> Self {
        let mut eq = EqualizerState::default();
        match &equalizer.bands {
            Some(values) if values.len() == EQ_BANDS => {
                let mut bands = [0.0; EQ_BANDS];
                bands.copy_from_slice(values);
                eq.set_values(bands);
            }
            _ => {
                if let Some(preset) = EqPreset::find(&equalizer.preset) {
                    eq.apply_preset(preset);
                }
            }
        }
        eq.set_enabled(equalizer.enabled);

        Self {
            stream: None,
            sink: None,
            loaded: None,
            position_offset: Duration::ZERO,
            bank: EqBank::new(eq.applied()),
            eq,
            gain: GainControl::new(audio.volume),
            analysis: AnalysisBuffer::new(audio.analysis_size),
        }
    }

    /// Open the output device. Calling it again once it succeeded is a
    /// no-op; a failure is logged and retried by the next `load`/`play`.
    pub fn initialize(&mut self) -> bool {
        if self.stream.is_some() {
            return true;
        }
        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio prints to stderr on drop, which would corrupt the TUI.
                stream.log_on_drop(false);
                log::info!("audio: output stream opened");
                self.stream = Some(stream);
                true
            }
            Err(e) => {
                log::warn!("audio: output not available yet, deferring: {e}");
                false
            }
        }
    }

    #[cfg(test)]
    pub fn is_initialized(&self) -> bool {
        self.stream.is_some()
    }

    fn ensure_output(&mut self) -> Result<&OutputStream, AudioError> {
        if !self.initialize() {
            return Err(AudioError::OutputUnavailable(
                "no default output device".to_string(),
            ));
        }
        self.stream
            .as_ref()
            .ok_or_else(|| AudioError::OutputUnavailable("output stream closed".to_string()))
    }

    pub fn volume(&self) -> f32 {
        self.gain.get()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.gain.set(volume);
    }

    pub fn equalizer(&self) -> &EqualizerState {
        &self.eq
    }

    /// Gains the filters are currently running with.
    pub fn applied_band_gains(&self) -> [f32; EQ_BANDS] {
        self.bank.load()
    }

    fn push_eq(&self) {
        self.bank.store(self.eq.applied());
    }

    pub fn set_band_gain(&mut self, index: usize, db: f32) -> Result<(), AudioError> {
        self.eq.set_band(index, db)?;
        self.push_eq();
        Ok(())
    }

    pub fn set_equalizer_enabled(&mut self, enabled: bool) {
        self.eq.set_enabled(enabled);
        self.push_eq();
    }

    pub fn apply_preset(&mut self, preset: &EqPreset) {
        self.eq.apply_preset(preset);
        self.push_eq();
    }

    pub fn set_band_values(&mut self, values: [f32; EQ_BANDS]) {
        self.eq.set_values(values);
        self.push_eq();
    }

    fn is_audible(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && !s.empty())
    }

    /// Latest time-domain block as bytes (128 = silence); empty while
    /// nothing is playing.
    pub fn sample_analysis(&self) -> Vec<u8> {
        if !self.is_audible() {
            return Vec::new();
        }
        self.analysis.waveform()
    }

    /// Byte magnitude spectrum of the same block; empty while nothing is
    /// playing.
    pub fn sample_spectrum(&self) -> Vec<u8> {
        if !self.is_audible() {
            return Vec::new();
        }
        self.analysis.spectrum()
    }

    /// Wire a freshly resolved source, starting `start_at` into the track,
    /// into a new paused sink. The previous sink is stopped and dropped.
    fn bind(&mut self, track: &Track, start_at: Duration) -> Result<Option<Duration>, AudioError> {
        let resolved = library::resolve(track)?;

        self.release_source();

        let eq = EqChain::new(resolved.source.skip_duration(start_at), self.bank.clone());
        let chain = AnalysisTap::new(GainStage::new(eq, self.gain.clone()), self.analysis.clone());

        let stream = self.ensure_output()?;
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        sink.append(chain);

        self.sink = Some(sink);
        self.loaded = Some(track.clone());
        self.position_offset = start_at;
        Ok(resolved.duration)
    }

    fn release_source(&mut self) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.loaded = None;
        self.position_offset = Duration::ZERO;
        self.analysis.clear();
    }

    /// Stop playback and release the output device.
    pub fn close(&mut self) {
        self.release_source();
        if self.stream.take().is_some() {
            log::info!("audio: output stream closed");
        }
    }
}

impl MediaOutput for SignalGraph {
    fn load(&mut self, track: &Track) -> Result<Option<Duration>, AudioError> {
        self.ensure_output()?;
        self.bind(track, Duration::ZERO)
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.ensure_output()?;
        let sink = self.sink.as_ref().ok_or(AudioError::NothingToPlay)?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        self.release_source();
    }

    fn seek(&mut self, pos: Duration) -> Result<(), AudioError> {
        let Some(sink) = &self.sink else {
            return Err(AudioError::NothingToPlay);
        };
        match sink.try_seek(pos) {
            Ok(()) => {
                self.position_offset = Duration::ZERO;
                Ok(())
            }
            Err(e) => {
                // Decoder cannot seek: reopen and skip forward instead.
                log::debug!("audio: seek unsupported ({e}), reopening at {pos:?}");
                let paused = sink.is_paused();
                let track = self
                    .loaded
                    .clone()
                    .ok_or_else(|| AudioError::Seek(e.to_string()))?;
                self.bind(&track, pos)?;
                if !paused {
                    self.play()?;
                }
                Ok(())
            }
        }
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|s| s.get_pos() + self.position_offset)
            .unwrap_or(Duration::ZERO)
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().is_some_and(Sink::empty)
    }
}

impl Drop for SignalGraph {
    fn drop(&mut self) {
        self.close();
    }
}
