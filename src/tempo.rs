//! Tap-interval BPM estimation

use crate::error::{AppError, AppResult};

/// What a single tap did to the estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tap {
    /// Enough taps collected; carries the raw, unclamped tempo estimate
    Estimate(f64),
    /// The gap since the previous tap exceeded the reset threshold and a
    /// new session was started from this tap alone
    Reset,
    /// Not enough taps in the current session yet
    Pending,
}

/// Estimates a tempo from the intervals between recent taps.
///
/// Taps are timestamps in seconds on a monotonic clock. Whenever the gap to
/// the previous tap exceeds `reset_threshold` the history collapses to the
/// newest tap and a fresh session begins. Once a session holds at least
/// [`crate::constants::tempo::MIN_TAPS`] taps, the estimate is recomputed
/// over the whole remaining record on every tap: the first interval of the
/// session is treated as an unreliable lead-in and excluded, the rest are
/// averaged and converted with `60 / avg`.
pub struct TapTempo {
    taps: Vec<f64>,
    reset_threshold: f64,
}

impl TapTempo {
    pub fn new(reset_threshold: f64) -> Self {
        Self {
            taps: Vec::new(),
            reset_threshold,
        }
    }

    /// Record a tap at `now` (seconds) and report what it produced.
    ///
    /// Non-finite or backwards timestamps are discarded and reported as
    /// [`AppError::InvalidTiming`]; the tap record is left as it was.
    pub fn record_tap(&mut self, now: f64) -> AppResult<Tap> {
        if !now.is_finite() {
            return Err(AppError::InvalidTiming);
        }

        if let Some(&last) = self.taps.last() {
            if now < last {
                return Err(AppError::InvalidTiming);
            }
            if now - last > self.reset_threshold {
                self.taps.clear();
                self.taps.push(now);
                return Ok(Tap::Reset);
            }
        }

        self.taps.push(now);

        if self.taps.len() < crate::constants::tempo::MIN_TAPS {
            return Ok(Tap::Pending);
        }

        // Recompute from the full record each time; the window shrinks to one
        // element on reset and grows by one tap per call afterwards.
        let intervals: Vec<f64> = self.taps.windows(2).map(|w| w[1] - w[0]).collect();
        let tail = &intervals[1..];
        let avg = tail.iter().sum::<f64>() / tail.len() as f64;

        if !(avg.is_finite() && avg > 0.0) {
            // Duplicate timestamps collapse the average to zero; drop the
            // offending tap instead of propagating a non-finite tempo.
            self.taps.pop();
            return Err(AppError::InvalidTiming);
        }

        Ok(Tap::Estimate(60.0 / avg))
    }

    /// Clear the tap history explicitly.
    pub fn reset(&mut self) {
        self.taps.clear();
    }

    /// Number of taps in the current session.
    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_taps_estimate_120_bpm() {
        let mut tapper = TapTempo::new(2.0);

        assert_eq!(tapper.record_tap(0.0).unwrap(), Tap::Pending);
        assert_eq!(tapper.record_tap(0.5).unwrap(), Tap::Pending);

        // Third tap: intervals [0.5, 0.5], lead-in dropped, avg 0.5
        match tapper.record_tap(1.0).unwrap() {
            Tap::Estimate(bpm) => assert!((bpm - 120.0).abs() < 1e-9),
            other => panic!("expected estimate, got {:?}", other),
        }

        // Fourth tap: intervals [0.5, 0.5, 0.5], lead-in dropped, avg 0.5
        match tapper.record_tap(1.5).unwrap() {
            Tap::Estimate(bpm) => assert!((bpm - 120.0).abs() < 1e-9),
            other => panic!("expected estimate, got {:?}", other),
        }
    }

    #[test]
    fn lead_in_interval_is_excluded() {
        let mut tapper = TapTempo::new(2.0);

        tapper.record_tap(0.0).unwrap();
        tapper.record_tap(0.9).unwrap();
        // Intervals [0.9, 0.5, 0.5]; only the last two count -> 120 BPM
        tapper.record_tap(1.4).unwrap();
        match tapper.record_tap(1.9).unwrap() {
            Tap::Estimate(bpm) => assert!((bpm - 120.0).abs() < 1e-9),
            other => panic!("expected estimate, got {:?}", other),
        }
    }

    #[test]
    fn long_gap_resets_the_session() {
        let mut tapper = TapTempo::new(2.0);

        tapper.record_tap(0.0).unwrap();
        tapper.record_tap(0.5).unwrap();
        // Gap of 2.5s exceeds the threshold
        assert_eq!(tapper.record_tap(3.0).unwrap(), Tap::Reset);
        assert_eq!(tapper.tap_count(), 1);

        // A fresh session needs three taps before estimating again
        assert_eq!(tapper.record_tap(3.5).unwrap(), Tap::Pending);
        assert!(matches!(tapper.record_tap(4.0).unwrap(), Tap::Estimate(_)));
    }

    #[test]
    fn gap_equal_to_threshold_does_not_reset() {
        let mut tapper = TapTempo::new(2.0);

        tapper.record_tap(0.0).unwrap();
        assert_eq!(tapper.record_tap(2.0).unwrap(), Tap::Pending);
        assert_eq!(tapper.tap_count(), 2);
    }

    #[test]
    fn backwards_timestamp_is_discarded() {
        let mut tapper = TapTempo::new(2.0);

        tapper.record_tap(1.0).unwrap();
        assert!(matches!(
            tapper.record_tap(0.5),
            Err(AppError::InvalidTiming)
        ));
        assert_eq!(tapper.tap_count(), 1);

        // The record is still usable afterwards
        tapper.record_tap(1.5).unwrap();
        assert!(matches!(tapper.record_tap(2.0).unwrap(), Tap::Estimate(_)));
    }

    #[test]
    fn non_finite_timestamp_is_rejected() {
        let mut tapper = TapTempo::new(2.0);

        assert!(matches!(
            tapper.record_tap(f64::NAN),
            Err(AppError::InvalidTiming)
        ));
        assert!(matches!(
            tapper.record_tap(f64::INFINITY),
            Err(AppError::InvalidTiming)
        ));
        assert_eq!(tapper.tap_count(), 0);
    }

    #[test]
    fn duplicate_timestamps_do_not_produce_infinite_bpm() {
        let mut tapper = TapTempo::new(2.0);

        tapper.record_tap(1.0).unwrap();
        tapper.record_tap(1.0).unwrap();
        assert!(matches!(
            tapper.record_tap(1.0),
            Err(AppError::InvalidTiming)
        ));
        // The zero-interval sample was dropped again
        assert_eq!(tapper.tap_count(), 2);
    }

    #[test]
    fn reset_clears_history() {
        let mut tapper = TapTempo::new(2.0);

        tapper.record_tap(0.0).unwrap();
        tapper.record_tap(0.5).unwrap();
        tapper.reset();
        assert_eq!(tapper.tap_count(), 0);
        assert_eq!(tapper.record_tap(1.0).unwrap(), Tap::Pending);
    }
}
