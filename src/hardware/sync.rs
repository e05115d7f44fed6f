//! Touch/sync arbitration between the motorized fader and playback.
//!
//! While the fader is idle the host drives it (`TARGET`), while it is touched
//! the fader drives playback (seeks). All timing decisions take an explicit
//! `now` so the rules can be exercised without a clock.

use std::time::{Duration, Instant};

use super::protocol::RAW_MAX;

/// Minimum spacing between two `TARGET` sends.
pub const TARGET_INTERVAL: Duration = Duration::from_millis(100);
/// Minimum spacing between two touch-driven seeks.
pub const TOUCH_INTERVAL: Duration = Duration::from_millis(100);
/// Fader movement (raw units) that counts as jitter.
pub const TOUCH_NOISE_FLOOR: u16 = 5;
/// Seeks closer than this to the previously applied one are dropped.
pub const SEEK_THRESHOLD: Duration = Duration::from_millis(500);

/// Fader position mirroring `position` within `duration`, or `None` while the
/// duration is unknown.
pub fn target_for(position: Duration, duration: Duration) -> Option<u16> {
    if duration.is_zero() {
        return None;
    }
    let ratio = (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
    Some((ratio * f64::from(RAW_MAX)).round() as u16)
}

/// Playback time a raw fader position stands for.
pub fn time_for(raw: u16, duration: Duration) -> Duration {
    duration.mul_f64(f64::from(raw.min(RAW_MAX)) / f64::from(RAW_MAX))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TouchDecision {
    /// First report of a touch; only recorded as the reference point.
    Baseline,
    /// Recorded for display, no seek.
    Hold,
    /// Seek playback to this time.
    Seek(Duration),
}

#[derive(Debug, Default)]
pub struct SyncArbiter {
    last_sent_target: Option<u16>,
    last_target_at: Option<Instant>,
    touch_baseline: Option<u16>,
    last_seek_at: Option<Instant>,
    /// Last time a touch seek applied; starts at the track origin.
    last_seek_time: Duration,
}

impl SyncArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn last_sent_target(&self) -> Option<u16> {
        self.last_sent_target
    }

    /// Whether `target` should go out now. `fader` is the position the
    /// device last reported.
    pub fn should_send_target(&self, target: u16, fader: Option<u16>, now: Instant) -> bool {
        match self.last_sent_target {
            Some(last) if last == target => return false,
            // Nothing sent on this connection yet and the fader already sits
            // where it should.
            None if fader == Some(target) => return false,
            _ => {}
        }
        match self.last_target_at {
            Some(at) => now.saturating_duration_since(at) >= TARGET_INTERVAL,
            None => true,
        }
    }

    pub fn record_target(&mut self, target: u16, now: Instant) {
        self.last_sent_target = Some(target);
        self.last_target_at = Some(now);
    }

    /// Decide what a `TOUCH:<raw>` report means for playback.
    pub fn on_touch(&mut self, raw: u16, duration: Duration, now: Instant) -> TouchDecision {
        let Some(baseline) = self.touch_baseline else {
            self.touch_baseline = Some(raw);
            return TouchDecision::Baseline;
        };

        if let Some(at) = self.last_seek_at {
            if now.saturating_duration_since(at) < TOUCH_INTERVAL {
                return TouchDecision::Hold;
            }
        }
        if raw.abs_diff(baseline) <= TOUCH_NOISE_FLOOR || duration.is_zero() {
            return TouchDecision::Hold;
        }

        let time = time_for(raw, duration);
        if time.abs_diff(self.last_seek_time) <= SEEK_THRESHOLD {
            return TouchDecision::Hold;
        }

        self.touch_baseline = Some(raw);
        self.last_seek_at = Some(now);
        self.last_seek_time = time;
        TouchDecision::Seek(time)
    }

    /// The fader was released: the next touch starts from a fresh baseline.
    /// The last applied seek time survives, so a retouch at the same spot
    /// does not seek again.
    pub fn on_sync(&mut self) {
        self.touch_baseline = None;
    }

    /// Forget everything (new connection).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
