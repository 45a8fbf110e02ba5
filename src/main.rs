//! Weather Station Monitoring Service - Main Daemon
//!
//! A station-side daemon that continuously:
//! 1. Polls the sensor at the configured reading interval
//! 2. Validates each measurement against the reading schema
//! 3. Appends validated readings to the daily JSONL journal
//! 4. Evaluates readings against configured thresholds
//! 5. Dispatches alert events to registered handlers
//!
//! This binary wires the controller to the in-crate mock sensor; a real
//! deployment links a hardware driver implementing the `Sensor` trait.
//!
//! Usage:
//!   cargo run --release                         # uses ./station.toml
//!   cargo run --release -- --config other.toml
//!
//! Environment:
//!   RUST_LOG - tracing filter (default: info)

use std::env;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wxmon_service::config;
use wxmon_service::controller::{Controller, ControllerConfig};
use wxmon_service::journal::ReadingJournal;
use wxmon_service::model::AlertEvent;
use wxmon_service::sensor::MockSensor;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path = "station.toml".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a path");
                    return ExitCode::FAILURE;
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--config PATH]", args[0]);
                return ExitCode::FAILURE;
            }
        }
    }

    let file = match config::load_config(&config_path) {
        Ok(file) => file,
        Err(e) => {
            error!(path = %config_path, error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let journal = match ReadingJournal::open(&file.monitor.data_dir) {
        Ok(journal) => journal,
        Err(e) => {
            error!(data_dir = %file.monitor.data_dir.display(), error = %e, "failed to open journal");
            return ExitCode::FAILURE;
        }
    };

    let mut controller = Controller::new(
        file.station.clone(),
        MockSensor,
        file.thresholds(),
        journal,
        ControllerConfig {
            reading_interval: file.monitor.reading_interval(),
            max_consecutive_errors: file.monitor.max_consecutive_errors,
        },
    );

    // Surface alerts in the service log; real transports (email, SMS)
    // register here the same way.
    controller.add_alert_handler(|event: &AlertEvent| {
        warn!(
            alert_id = %event.alert_id,
            severity = %event.severity,
            "{}", event.message
        );
        Ok(())
    });

    // Ctrl+C requests a cooperative stop; the loop finishes its
    // in-flight cycle and cleans up the sensor before exiting.
    let handle = controller.handle();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("shutdown requested");
        handle.stop();
    }) {
        error!(error = %e, "failed to install signal handler");
        return ExitCode::FAILURE;
    }

    info!(
        station = %file.station.station_id,
        name = %file.station.name,
        thresholds = file.threshold.len(),
        "starting weather station monitoring"
    );

    match controller.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "monitoring terminated");
            ExitCode::FAILURE
        }
    }
}
