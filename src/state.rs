//! Session state and estimator/metronome orchestration

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metronome::Metronome;
use crate::tempo::{Tap, TapTempo};
use std::time::Instant;

/// What a tap did to the session, for the UI and audio layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapFeedback {
    /// A new clamped tempo was displayed
    Estimate(f64),
    /// A new session began; carries the latched previous tempo
    Reset { previous: f64 },
    /// Not enough taps yet, displayed tempo untouched
    Pending,
}

/// Owns the estimator, the metronome and the displayed tempo values.
///
/// The coupling rules live here rather than in the UI: a fresh estimate or a
/// half/double adjustment drops a running metronome instead of re-syncing it,
/// and the previous tempo is latched on session reset unless locked.
pub struct AppState {
    pub tempo: TapTempo,
    pub metronome: Metronome,
    /// Currently displayed tempo; zero until the first estimate
    pub bpm: f64,
    /// Tempo that was displayed just before the latest session reset
    pub last_bpm: f64,
    /// Suppresses `last_bpm` updates on reset while set
    pub locked: bool,
    min_bpm: f64,
    max_bpm: f64,
}

impl AppState {
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            tempo: TapTempo::new(config.threshold),
            metronome: Metronome::new(config.initial_bpm)?,
            bpm: 0.0,
            last_bpm: 0.0,
            locked: config.locked,
            min_bpm: config.min_bpm,
            max_bpm: config.max_bpm,
        })
    }

    /// Feed one tap through the estimator and apply the session rules.
    pub fn tap(&mut self, now_secs: f64) -> AppResult<TapFeedback> {
        match self.tempo.record_tap(now_secs)? {
            Tap::Estimate(raw) => {
                self.bpm = self.clamp_bpm(raw);
                // A fresh estimate silently drops a running metronome; the
                // user restarts it at the new tempo explicitly.
                self.metronome.stop();
                Ok(TapFeedback::Estimate(self.bpm))
            }
            Tap::Reset => {
                if !self.locked {
                    self.last_bpm = self.bpm;
                }
                Ok(TapFeedback::Reset {
                    previous: self.last_bpm,
                })
            }
            Tap::Pending => Ok(TapFeedback::Pending),
        }
    }

    /// Scale the displayed tempo by `factor` (0.5 halves, 2.0 doubles).
    /// A running metronome is stopped first and not restarted.
    pub fn adjust(&mut self, factor: f64) -> AppResult<f64> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(AppError::InvalidBpm(factor));
        }

        self.metronome.stop();
        self.bpm = self.clamp_bpm(self.bpm * factor);
        Ok(self.bpm)
    }

    /// Shift the displayed tempo by `delta` without touching the metronome.
    pub fn nudge(&mut self, delta: f64) -> f64 {
        self.bpm = self.clamp_bpm(self.bpm + delta);
        self.bpm
    }

    /// Stop the metronome if it is running; otherwise retarget it to the
    /// displayed tempo and start it in one step. Returns the new running
    /// state.
    pub fn toggle_metronome(&mut self, now: Instant) -> AppResult<bool> {
        if self.metronome.is_running() {
            self.metronome.stop();
            Ok(false)
        } else {
            self.metronome.retarget(self.bpm, now)?;
            self.metronome.start(now)?;
            Ok(true)
        }
    }

    /// Flip the lock flag; returns the new value.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }

    fn clamp_bpm(&self, bpm: f64) -> f64 {
        bpm.clamp(self.min_bpm, self.max_bpm)
    }
}
