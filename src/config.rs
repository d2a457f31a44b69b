//! Configuration parsing and validation

use clap::{Parser, Subcommand};

/// Command line arguments for the beatcheck application
#[derive(Parser)]
#[command(name = "beatcheck")]
#[command(about = "Tap-tempo BPM estimation and metronome tools")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive tap-tempo display with a metronome
    Run(RunArgs),
    /// List available audio output devices
    List(ListArgs),
    /// Estimate BPM from tap timestamps given on the command line or stdin
    Tap(TapArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Gap between taps in seconds above which a new tap session begins
    #[arg(long, default_value_t = crate::constants::tempo::RESET_THRESHOLD_SECS)]
    pub threshold: f64,

    /// Lower clamp bound for the displayed BPM
    #[arg(long, default_value_t = crate::constants::tempo::MIN_BPM)]
    pub min_bpm: f64,

    /// Upper clamp bound for the displayed BPM
    #[arg(long, default_value_t = crate::constants::tempo::MAX_BPM)]
    pub max_bpm: f64,

    /// Tempo the metronome starts out with before any taps
    #[arg(long, default_value_t = crate::constants::metronome::DEFAULT_BPM)]
    pub bpm: f64,

    /// Audio output device name (optional, uses default if not specified)
    #[arg(long)]
    pub device: Option<String>,

    /// Start with the previous-tempo display locked
    #[arg(long)]
    pub lock: bool,

    /// Disable the audible click (visual flash only)
    #[arg(long)]
    pub mute: bool,
}

#[derive(Parser)]
pub struct TapArgs {
    /// Tap timestamps in seconds (reads whitespace-separated values from
    /// stdin when omitted)
    pub times: Vec<f64>,

    /// Gap between taps in seconds above which a new tap session begins
    #[arg(long, default_value_t = crate::constants::tempo::RESET_THRESHOLD_SECS)]
    pub threshold: f64,

    /// Lower clamp bound for the reported BPM
    #[arg(long, default_value_t = crate::constants::tempo::MIN_BPM)]
    pub min_bpm: f64,

    /// Upper clamp bound for the reported BPM
    #[arg(long, default_value_t = crate::constants::tempo::MAX_BPM)]
    pub max_bpm: f64,

    /// Output only the estimated values without labels
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Parser)]
pub struct ListArgs {}

/// Application configuration derived from command line arguments
pub struct Config {
    pub threshold: f64,
    pub min_bpm: f64,
    pub max_bpm: f64,
    pub initial_bpm: f64,
    pub device_name: Option<String>,
    pub locked: bool,
    pub mute: bool,
}

impl Config {
    /// Create configuration from run arguments
    pub fn from_run_args(run_args: RunArgs) -> Result<Self, Box<dyn std::error::Error>> {
        validate_tempo_bounds(run_args.threshold, run_args.min_bpm, run_args.max_bpm)?;

        // Validate the initial metronome tempo
        if !(run_args.bpm.is_finite() && run_args.bpm > 0.0) {
            return Err(format!("Initial BPM must be positive, got {}", run_args.bpm).into());
        }

        Ok(Config {
            threshold: run_args.threshold,
            min_bpm: run_args.min_bpm,
            max_bpm: run_args.max_bpm,
            initial_bpm: run_args.bpm,
            device_name: run_args.device,
            locked: run_args.lock,
            mute: run_args.mute,
        })
    }

    /// Create configuration from tap arguments
    pub fn from_tap_args(tap_args: &TapArgs) -> Result<Self, Box<dyn std::error::Error>> {
        validate_tempo_bounds(tap_args.threshold, tap_args.min_bpm, tap_args.max_bpm)?;

        Ok(Config {
            threshold: tap_args.threshold,
            min_bpm: tap_args.min_bpm,
            max_bpm: tap_args.max_bpm,
            initial_bpm: crate::constants::metronome::DEFAULT_BPM,
            device_name: None,
            locked: false,
            mute: true,
        })
    }
}

fn validate_tempo_bounds(
    threshold: f64,
    min_bpm: f64,
    max_bpm: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(format!("Reset threshold must be positive, got {}", threshold).into());
    }

    if !min_bpm.is_finite() || !max_bpm.is_finite() || min_bpm < 0.0 {
        return Err(format!("BPM bounds must be non-negative, got {}..{}", min_bpm, max_bpm).into());
    }

    if min_bpm >= max_bpm {
        return Err(format!(
            "Minimum BPM must be below maximum BPM, got {}..{}",
            min_bpm, max_bpm
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args() -> RunArgs {
        RunArgs {
            threshold: 2.0,
            min_bpm: 0.0,
            max_bpm: 999.0,
            bpm: 120.0,
            device: None,
            lock: false,
            mute: false,
        }
    }

    #[test]
    fn test_config_from_valid_run_args() {
        let config = Config::from_run_args(run_args()).unwrap();

        assert_eq!(config.threshold, 2.0);
        assert_eq!(config.min_bpm, 0.0);
        assert_eq!(config.max_bpm, 999.0);
        assert_eq!(config.initial_bpm, 120.0);
        assert!(!config.locked);
        assert!(!config.mute);
    }

    #[test]
    fn test_threshold_must_be_positive() {
        let mut args = run_args();
        args.threshold = 0.0;
        assert!(Config::from_run_args(args).is_err());

        let mut args = run_args();
        args.threshold = -1.0;
        assert!(Config::from_run_args(args).is_err());
    }

    #[test]
    fn test_bpm_bounds_must_be_ordered() {
        let mut args = run_args();
        args.min_bpm = 200.0;
        args.max_bpm = 100.0;
        assert!(Config::from_run_args(args).is_err());

        let mut args = run_args();
        args.min_bpm = 100.0;
        args.max_bpm = 100.0;
        assert!(Config::from_run_args(args).is_err());
    }

    #[test]
    fn test_initial_bpm_must_be_positive() {
        let mut args = run_args();
        args.bpm = 0.0;
        assert!(Config::from_run_args(args).is_err());
    }

    #[test]
    fn test_config_from_tap_args_is_muted() {
        let args = TapArgs {
            times: vec![0.0, 0.5, 1.0],
            threshold: 2.0,
            min_bpm: 0.0,
            max_bpm: 999.0,
            quiet: false,
        };

        let config = Config::from_tap_args(&args).unwrap();
        assert!(config.mute);
        assert!(config.device_name.is_none());
    }
}
