//! Application constants and configuration values

/// Tap-tempo estimation constants
pub mod tempo {
    /// Gap between taps (seconds) above which a new tap session begins
    pub const RESET_THRESHOLD_SECS: f64 = 2.0;
    /// Minimum number of taps in a session before a tempo is estimated
    pub const MIN_TAPS: usize = 3;
    /// Lower clamp bound for displayed BPM
    pub const MIN_BPM: f64 = 0.0;
    /// Upper clamp bound for displayed BPM
    pub const MAX_BPM: f64 = 999.0;
}

/// Metronome constants
pub mod metronome {
    /// Tempo the metronome starts out with before any taps
    pub const DEFAULT_BPM: f64 = 120.0;
    /// How long the visual beat flash stays lit
    pub const FLASH_DURATION_MS: u64 = 120;
}

/// Click synthesis constants
pub mod click {
    /// Click tone frequency in Hz
    pub const FREQ_HZ: f32 = 880.0;
    /// Click length in seconds
    pub const DURATION_SECS: f32 = 0.03;
    /// Exponential decay rate applied over the click
    pub const DECAY_RATE: f32 = 120.0;
    /// Output gain of the click
    pub const GAIN: f32 = 0.6;
}

/// Audio output constants
pub mod audio {
    /// Preferred number of output channels
    pub const DEFAULT_CHANNELS: u16 = 2;
    /// Buffer size for audio streams
    pub const BUFFER_SIZE: cpal::BufferSize = cpal::BufferSize::Default;
}

/// UI display constants
pub mod ui {
    /// UI update interval in milliseconds
    pub const UPDATE_INTERVAL_MS: u64 = 10;
    /// Bar width calculation accounts for borders
    pub const BAR_BORDER_WIDTH: usize = 2;
    /// BPM step applied by the Up/Down arrow keys
    pub const NUDGE_STEP: f64 = 1.0;
}
