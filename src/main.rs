//! SetuGCS - text-mode ground-control client
//!
//! Thin collaborator around the bridge: loads config, wires the TCP
//! transport, and prints fleet state once a second until interrupted.
//! A graphical frontend would replace only this file.

use setu_gcs::transport::TcpTransport;
use setu_gcs::types::{state_name, time};
use setu_gcs::{AppConfig, Bridge, FleetMonitor, Result};
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `setu-gcs <path>` (positional)
/// - `setu-gcs --config <path>` (flag-based)
/// - `setu-gcs -c <path>` (short flag)
///
/// Defaults to `setu-gcs.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "setu-gcs.toml".to_string()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = parse_config_path();
    let config = if Path::new(&config_path).exists() {
        log::info!("Using config: {}", config_path);
        AppConfig::from_file(&config_path)?
    } else {
        log::info!("Config {} not found, using localhost defaults", config_path);
        AppConfig::localhost_defaults()
    };

    let transport = Arc::new(TcpTransport::new());
    let bridge = Arc::new(Bridge::connect(transport, &config.bridge)?);
    let monitor = FleetMonitor::new(Arc::clone(&bridge));

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| setu_gcs::Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    log::info!("SetuGCS running. Press Ctrl-C to stop.");

    let mut printed_logs = 0;
    while running.load(Ordering::Relaxed) && bridge.is_running() {
        thread::sleep(Duration::from_secs(1));

        let vehicles = monitor.vehicles();
        if vehicles.is_empty() {
            log::info!("no vehicle telemetry yet");
        }
        for snap in vehicles {
            log::info!(
                "vehicle {}: pos [{:.2} {:.2} {:.2}] battery {:.2}V fsm {}/{}/{} ({:.1}s ago)",
                snap.id,
                snap.pos[0],
                snap.pos[1],
                snap.pos[2],
                snap.battery_voltage,
                state_name(snap.fsm_state[0]),
                state_name(snap.fsm_state[1]),
                state_name(snap.fsm_state[2]),
                time::seconds_since(snap.timestamp),
            );
        }

        for line in monitor.logs_since(printed_logs) {
            log::info!("vehicle log: {}", line.trim_end());
            printed_logs += 1;
        }
    }

    log::info!("Shutting down...");
    drop(monitor);
    bridge.close();
    log::info!("SetuGCS stopped");
    Ok(())
}
