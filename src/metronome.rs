//! Metronome tick scheduling

use crate::error::{AppError, AppResult};
use std::time::{Duration, Instant};

/// Periodic beat scheduler driven by the caller's event loop.
///
/// The metronome holds the tempo and the deadline of the next tick but owns
/// no timer of its own: the event loop sleeps until [`Metronome::next_deadline`]
/// and calls [`Metronome::advance`] when the tick fires. Keeping all mutation
/// on one task means a tick can never be delivered after `stop` returns, and
/// retargeting is atomic with respect to tick delivery.
pub struct Metronome {
    bpm: f64,
    running: bool,
    next_tick: Option<Instant>,
}

impl Metronome {
    pub fn new(bpm: f64) -> AppResult<Self> {
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(AppError::InvalidBpm(bpm));
        }

        Ok(Self {
            bpm,
            running: false,
            next_tick: None,
        })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Length of one beat at the current tempo.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.bpm)
    }

    /// Begin ticking; the first tick is due one period after `now`.
    pub fn start(&mut self, now: Instant) -> AppResult<()> {
        if self.running {
            return Err(AppError::AlreadyRunning);
        }

        self.next_tick = Some(now + self.period());
        self.running = true;
        Ok(())
    }

    /// Stop ticking. No-op when already stopped.
    pub fn stop(&mut self) {
        self.running = false;
        self.next_tick = None;
    }

    /// Change the tempo. While running this restarts the schedule at the new
    /// period; the phase is not preserved across a tempo change.
    pub fn retarget(&mut self, bpm: f64, now: Instant) -> AppResult<()> {
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(AppError::InvalidBpm(bpm));
        }

        self.bpm = bpm;
        if self.running {
            self.next_tick = Some(now + self.period());
        }
        Ok(())
    }

    /// Stop if running, start otherwise.
    pub fn toggle(&mut self, now: Instant) -> AppResult<()> {
        if self.running {
            self.stop();
            Ok(())
        } else {
            self.start(now)
        }
    }

    /// Deadline of the next tick, if the metronome is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Move the schedule past a fired tick. The next deadline is measured
    /// from the previous scheduled time, not from when the handler ran, so a
    /// slow tick handler cannot accumulate drift.
    pub fn advance(&mut self) {
        if let Some(due) = self.next_tick {
            self.next_tick = Some(due + self.period());
        }
    }

    /// Progress toward the next tick as a ratio in `[0, 1]`, for display.
    pub fn phase(&self, now: Instant) -> Option<f64> {
        let next = self.next_tick?;
        let period = self.period().as_secs_f64();
        let remaining = next.saturating_duration_since(now).as_secs_f64();
        Some((1.0 - remaining / period).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_schedules_one_period_ahead() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        metronome.start(t0).unwrap();
        assert!(metronome.is_running());
        assert_eq!(
            metronome.next_deadline().unwrap(),
            t0 + Duration::from_millis(500)
        );
    }

    #[test]
    fn start_while_running_fails() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        metronome.start(t0).unwrap();
        assert!(matches!(
            metronome.start(t0),
            Err(AppError::AlreadyRunning)
        ));
        assert!(metronome.is_running());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        metronome.start(t0).unwrap();
        metronome.stop();
        metronome.stop();
        assert!(!metronome.is_running());
        assert!(metronome.next_deadline().is_none());
    }

    #[test]
    fn advance_measures_from_the_scheduled_time() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        metronome.start(t0).unwrap();
        metronome.advance();
        metronome.advance();
        // Two beats past the first deadline, regardless of handler latency
        assert_eq!(
            metronome.next_deadline().unwrap(),
            t0 + Duration::from_millis(1500)
        );
    }

    #[test]
    fn retarget_while_running_resets_the_phase() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        metronome.start(t0).unwrap();
        let t1 = t0 + Duration::from_millis(200);
        metronome.retarget(60.0, t1).unwrap();

        // Next tick is a full new period after the retarget, not the stale
        // 0.5s deadline from the old tempo.
        assert_eq!(
            metronome.next_deadline().unwrap(),
            t1 + Duration::from_secs(1)
        );
        assert!(metronome.is_running());
    }

    #[test]
    fn retarget_while_stopped_takes_effect_on_next_start() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        metronome.retarget(60.0, t0).unwrap();
        assert!(metronome.next_deadline().is_none());

        metronome.start(t0).unwrap();
        assert_eq!(
            metronome.next_deadline().unwrap(),
            t0 + Duration::from_secs(1)
        );
    }

    #[test]
    fn invalid_bpm_is_rejected_and_state_unchanged() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();
        metronome.start(t0).unwrap();
        let deadline = metronome.next_deadline();

        assert!(matches!(
            metronome.retarget(0.0, t0),
            Err(AppError::InvalidBpm(_))
        ));
        assert!(matches!(
            metronome.retarget(-10.0, t0),
            Err(AppError::InvalidBpm(_))
        ));
        assert!(matches!(
            metronome.retarget(f64::NAN, t0),
            Err(AppError::InvalidBpm(_))
        ));
        assert_eq!(metronome.bpm(), 120.0);
        assert_eq!(metronome.next_deadline(), deadline);

        assert!(matches!(Metronome::new(0.0), Err(AppError::InvalidBpm(_))));
    }

    #[test]
    fn toggle_flips_the_running_state() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        metronome.toggle(t0).unwrap();
        assert!(metronome.is_running());
        metronome.toggle(t0).unwrap();
        assert!(!metronome.is_running());
    }

    #[test]
    fn phase_reports_progress_toward_the_next_tick() {
        let mut metronome = Metronome::new(120.0).unwrap();
        let t0 = Instant::now();

        assert!(metronome.phase(t0).is_none());

        metronome.start(t0).unwrap();
        let quarter = metronome.phase(t0 + Duration::from_millis(125)).unwrap();
        assert!((quarter - 0.25).abs() < 0.01);

        // Past the deadline the phase saturates at 1.0
        let late = metronome.phase(t0 + Duration::from_secs(2)).unwrap();
        assert_eq!(late, 1.0);
    }
}
