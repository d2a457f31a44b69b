//! Main application logic and orchestration

use crate::audio;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::state::{AppState, TapFeedback};
use crate::ui;
use cpal::traits::StreamTrait;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};

/// Main application struct
pub struct App {
    config: Config,
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
}

/// Exit codes for the application
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    UserExit = 1, // User pressed Escape or Ctrl+C
    Error = 2,    // Actual application error
}

/// Result type that includes user exit information
pub type AppRunResult = Result<(), AppError>;

/// Extended result that tracks exit reason
pub struct RunResult {
    pub result: AppRunResult,
    pub exit_code: ExitCode,
}

impl App {
    /// Initialize the application with configuration
    pub fn new_with_config(config: Config) -> AppResult<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(App { config, terminal })
    }

    /// Run the main application loop
    pub async fn run(mut self) -> RunResult {
        // Setup the click output unless muted
        let click = if self.config.mute {
            None
        } else {
            match self.setup_click() {
                Ok(parts) => Some(parts),
                Err(e) => {
                    let _ = self.cleanup();
                    return RunResult {
                        result: Err(e),
                        exit_code: ExitCode::Error,
                    };
                }
            }
        };
        let click_trigger = click.as_ref().map(|(_, trigger)| trigger);

        // Create session state
        let mut app_state = match AppState::new(&self.config) {
            Ok(state) => state,
            Err(e) => {
                let _ = self.cleanup();
                return RunResult {
                    result: Err(e),
                    exit_code: ExitCode::Error,
                };
            }
        };

        // Tap timestamps come from the monotonic clock, measured from here
        let app_start = Instant::now();
        let mut flash_until: Option<Instant> = None;
        let mut status = String::from(
            "Tap Space to set a tempo. m: metronome  l: lock  h: half  d: double  q: quit",
        );

        // Main UI loop
        let mut interval = tokio::time::interval(Duration::from_millis(
            crate::constants::ui::UPDATE_INTERVAL_MS,
        ));
        let mut exit_reason = ExitCode::Success;

        loop {
            let now = Instant::now();
            let flash = flash_until.is_some_and(|deadline| now < deadline);
            if !flash {
                flash_until = None;
            }

            // Render UI
            if let Err(e) = self.terminal.draw(|f| {
                let ui_state = ui::UiState {
                    bpm: app_state.bpm,
                    last_bpm: app_state.last_bpm,
                    locked: app_state.locked,
                    metronome_running: app_state.metronome.is_running(),
                    metronome_bpm: app_state.metronome.bpm(),
                    tap_count: app_state.tempo.tap_count(),
                    beat_phase: app_state.metronome.phase(now),
                    flash,
                    min_bpm: self.config.min_bpm,
                    max_bpm: self.config.max_bpm,
                    status: status.clone(),
                };
                ui::render_ui(f, &ui_state);
            }) {
                let _ = self.cleanup();
                return RunResult {
                    result: Err(e.into()),
                    exit_code: ExitCode::Error,
                };
            }

            // Arm the tick branch only while the metronome is running. The
            // placeholder deadline is never polled when disarmed.
            let tick_deadline = app_state.metronome.next_deadline();
            let armed = tick_deadline.is_some();
            let deadline = tokio::time::Instant::from_std(
                tick_deadline.unwrap_or_else(|| now + Duration::from_secs(1)),
            );

            let mut should_exit = false;

            tokio::select! {
                _ = tokio::time::sleep_until(deadline), if armed => {
                    // Tick: schedule the next one from the due time, flash,
                    // and sound the click
                    app_state.metronome.advance();
                    if let Some(trigger) = click_trigger {
                        trigger.trigger();
                    }
                    flash_until = Some(
                        Instant::now()
                            + Duration::from_millis(
                                crate::constants::metronome::FLASH_DURATION_MS,
                            ),
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    should_exit = true;
                    exit_reason = ExitCode::UserExit;
                }
                _ = interval.tick() => {
                    // Redraw pass - fall through to the keyboard poll
                }
            }

            // Drain pending keyboard events without blocking
            while crossterm::event::poll(Duration::from_millis(0)).unwrap_or(false) {
                if let Ok(Event::Key(key_event)) = crossterm::event::read() {
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key_event.code {
                        KeyCode::Char(' ') | KeyCode::Char('t') => {
                            let tap_instant = Instant::now();
                            let tap_secs =
                                tap_instant.duration_since(app_start).as_secs_f64();
                            status = Self::handle_tap(&mut app_state, tap_secs);
                        }
                        KeyCode::Char('m') => {
                            status = match app_state.toggle_metronome(Instant::now()) {
                                Ok(true) => {
                                    format!("Metronome started at {:.1} BPM", app_state.bpm)
                                }
                                Ok(false) => "Metronome stopped".to_string(),
                                Err(AppError::InvalidBpm(_)) => {
                                    "Tap a tempo before starting the metronome".to_string()
                                }
                                Err(e) => e.to_string(),
                            };
                        }
                        KeyCode::Char('l') => {
                            status = if app_state.toggle_lock() {
                                "Previous tempo locked".to_string()
                            } else {
                                "Previous tempo unlocked".to_string()
                            };
                        }
                        KeyCode::Char('h') => {
                            status = match app_state.adjust(0.5) {
                                Ok(bpm) => format!("Halved to {:.1} BPM", bpm),
                                Err(e) => e.to_string(),
                            };
                        }
                        KeyCode::Char('d') => {
                            status = match app_state.adjust(2.0) {
                                Ok(bpm) => format!("Doubled to {:.1} BPM", bpm),
                                Err(e) => e.to_string(),
                            };
                        }
                        KeyCode::Up => {
                            app_state.nudge(crate::constants::ui::NUDGE_STEP);
                        }
                        KeyCode::Down => {
                            app_state.nudge(-crate::constants::ui::NUDGE_STEP);
                        }
                        KeyCode::Esc | KeyCode::Char('q') => {
                            should_exit = true;
                            exit_reason = ExitCode::UserExit;
                        }
                        KeyCode::Char('c')
                            if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            should_exit = true;
                            exit_reason = ExitCode::UserExit;
                        }
                        _ => {}
                    }
                }
            }

            if should_exit {
                break;
            }
        }

        // Cleanup - ensure graceful exit
        drop(click);
        let _ = self.cleanup(); // Ignore cleanup errors

        RunResult {
            result: Ok(()),
            exit_code: exit_reason,
        }
    }

    /// Feed a tap into the session and describe the outcome
    fn handle_tap(app_state: &mut AppState, tap_secs: f64) -> String {
        match app_state.tap(tap_secs) {
            Ok(TapFeedback::Estimate(bpm)) => format!("Estimated {:.1} BPM", bpm),
            Ok(TapFeedback::Reset { previous }) => {
                format!("New session (previous {:.1} BPM)", previous)
            }
            Ok(TapFeedback::Pending) => "Keep tapping...".to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// Open the output device and start the click stream
    fn setup_click(&self) -> AppResult<(cpal::Stream, audio::ClickTrigger)> {
        let (device, audio_config) = audio::setup_output_device(self.config.device_name.clone())?;

        let wave = audio::generate_click(audio_config.sample_rate);
        let trigger = audio::ClickTrigger::new(wave.len());
        let callback =
            audio::create_click_callback(wave, trigger.playhead(), audio_config.channels);

        let config = cpal::StreamConfig {
            channels: audio_config.channels,
            sample_rate: cpal::SampleRate(audio_config.sample_rate),
            buffer_size: crate::constants::audio::BUFFER_SIZE,
        };

        let stream = audio::build_click_stream(&device, &config, callback)?;
        stream.play()?;

        Ok((stream, trigger))
    }

    /// Clean up terminal state
    fn cleanup(&mut self) -> AppResult<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
