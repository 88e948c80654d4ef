//! Pacing model for the typewriter: per-character jitter, per-line pause,
//! and an optional lead-in before the first line.

use std::time::Duration;

use rand::Rng;

/// Default jitter window for a single character: `[30 ms, 50 ms)`.
pub const DEFAULT_CHAR_DELAY_MIN: Duration = Duration::from_millis(30);
pub const DEFAULT_CHAR_DELAY_MAX: Duration = Duration::from_millis(50);
/// Pause after a line's last character, before the next line starts.
pub const DEFAULT_LINE_PAUSE: Duration = Duration::from_millis(400);

/// Timing knobs for one [`Sequencer`](super::sequencer::Sequencer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Inclusive lower bound of the per-character delay.
    pub char_delay_min: Duration,
    /// Exclusive upper bound of the per-character delay.
    pub char_delay_max: Duration,
    pub line_pause: Duration,
    /// Delay between an accepted `start` and the first line.  The run is
    /// already active (and rejects re-entry) while this elapses.
    pub lead_in: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            char_delay_min: DEFAULT_CHAR_DELAY_MIN,
            char_delay_max: DEFAULT_CHAR_DELAY_MAX,
            line_pause: DEFAULT_LINE_PAUSE,
            lead_in: Duration::ZERO,
        }
    }
}

impl TimingConfig {
    /// Same pacing with a different lead-in.
    pub fn with_lead_in(mut self, lead_in: Duration) -> Self {
        self.lead_in = lead_in;
        self
    }

    /// Draw the next per-character delay.
    ///
    /// Uniform over `[min, max)`.  A degenerate window (`max <= min`)
    /// collapses to `min` rather than panicking on an empty range.
    pub fn char_delay(&self) -> Duration {
        if self.char_delay_max <= self.char_delay_min {
            return self.char_delay_min;
        }
        rand::rng().random_range(self.char_delay_min..self.char_delay_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_delay_stays_inside_window() {
        let timing = TimingConfig::default();
        for _ in 0..500 {
            let d = timing.char_delay();
            assert!(d >= DEFAULT_CHAR_DELAY_MIN, "{d:?} below window");
            assert!(d < DEFAULT_CHAR_DELAY_MAX, "{d:?} above window");
        }
    }

    #[test]
    fn char_delay_is_not_fixed_interval() {
        let timing = TimingConfig::default();
        let first = timing.char_delay();
        assert!((0..500).any(|_| timing.char_delay() != first));
    }

    #[test]
    fn degenerate_window_uses_minimum() {
        let timing = TimingConfig {
            char_delay_min: Duration::from_millis(20),
            char_delay_max: Duration::from_millis(10),
            ..TimingConfig::default()
        };
        assert_eq!(timing.char_delay(), Duration::from_millis(20));

        let flat = TimingConfig {
            char_delay_min: Duration::from_millis(5),
            char_delay_max: Duration::from_millis(5),
            ..TimingConfig::default()
        };
        assert_eq!(flat.char_delay(), Duration::from_millis(5));
    }

    #[test]
    fn with_lead_in_keeps_pacing() {
        let timing = TimingConfig::default().with_lead_in(Duration::from_secs(1));
        assert_eq!(timing.lead_in, Duration::from_secs(1));
        assert_eq!(timing.line_pause, DEFAULT_LINE_PAUSE);
    }
}
