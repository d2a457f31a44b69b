mod app;
mod audio;
mod config;
mod constants;
mod error;
mod metronome;
mod state;
mod tempo;
mod ui;

use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait};
use dialoguer::{Select, theme::ColorfulTheme};
use state::{AppState, TapFeedback};
use std::io::Read;

fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let host = cpal::default_host();
    let devices = host.output_devices()?;

    let device_list: Vec<String> = devices.filter_map(|d| d.name().ok()).collect();

    if device_list.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    // Interactive selection
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an audio output device")
        .items(&device_list)
        .default(0)
        .interact()?;

    println!("{}", device_list[selection]);

    Ok(())
}

/// Feed timestamps through the estimator and print what each tap produced
fn run_taps(
    config: &config::Config,
    times: &[f64],
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = AppState::new(config)?;

    for &t in times {
        match state.tap(t) {
            Ok(TapFeedback::Estimate(bpm)) => {
                if quiet {
                    println!("{:.1}", bpm);
                } else {
                    println!("t={:<8.3} {:.1} BPM", t, bpm);
                }
            }
            Ok(TapFeedback::Reset { previous }) => {
                if !quiet {
                    println!("t={:<8.3} reset (previous {:.1} BPM)", t, previous);
                }
            }
            Ok(TapFeedback::Pending) => {
                if !quiet {
                    println!("t={:<8.3} ...", t);
                }
            }
            Err(e) => {
                eprintln!("t={:<8.3} skipped: {}", t, e);
            }
        }
    }

    Ok(())
}

/// Parse whitespace-separated timestamps from stdin
fn read_times_from_stdin() -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let mut times = Vec::new();
    for token in input.split_whitespace() {
        let t: f64 = token
            .parse()
            .map_err(|_| format!("Invalid timestamp: {}", token))?;
        times.push(t);
    }

    Ok(times)
}

#[tokio::main]
async fn main() {
    use app::ExitCode;
    use config::{Args, Commands};

    let args = Args::parse();

    match args.command {
        Commands::Run(run_args) => {
            // Create config from run args
            let config = match config::Config::from_run_args(run_args) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            };

            // Handle exit codes appropriately
            match app::App::new_with_config(config) {
                Ok(app) => {
                    let run_result = app.run().await;
                    match run_result.result {
                        Ok(_) => {
                            std::process::exit(run_result.exit_code as i32);
                        }
                        Err(e) => {
                            eprintln!("Application error: {}", e);
                            std::process::exit(ExitCode::Error as i32);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Setup error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            }
        }
        Commands::List(_) => {
            if let Err(e) = list_devices() {
                eprintln!("Error listing devices: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }
        }
        Commands::Tap(tap_args) => {
            // Create config from tap args
            let config = match config::Config::from_tap_args(&tap_args) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            };

            // Use timestamps from the command line, or read them from stdin
            let times = if tap_args.times.is_empty() {
                match read_times_from_stdin() {
                    Ok(times) => times,
                    Err(e) => {
                        eprintln!("Input error: {}", e);
                        std::process::exit(ExitCode::Error as i32);
                    }
                }
            } else {
                tap_args.times.clone()
            };

            if let Err(e) = run_taps(&config, &times, tap_args.quiet) {
                eprintln!("Error estimating tempo: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }
        }
    }
}
