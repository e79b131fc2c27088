//! Configuration for the ground-control client
//!
//! Loaded from a TOML file; endpoints and topic strings must agree with
//! the on-vehicle side, which shares the same fixed wire layout.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    pub bridge: BridgeConfig,
    pub logging: LoggingConfig,
}

/// Endpoints and topics consumed by the bridge
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BridgeConfig {
    /// Address of the broker's inbound side (outgoing command frames)
    pub publish_address: String,
    /// Address of the broker's outbound side (telemetry and log frames)
    pub subscribe_address: String,
    /// Topic carrying telemetry frames
    pub telemetry_topic: String,
    /// Topic carrying outbound command frames
    pub command_topic: String,
    /// Topic carrying vehicle log lines
    pub log_topic: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Defaults for a broker on the local machine
    pub fn localhost_defaults() -> Self {
        Self {
            bridge: BridgeConfig {
                publish_address: "127.0.0.1:8551".to_string(),
                subscribe_address: "127.0.0.1:8550".to_string(),
                telemetry_topic: "vehicle/telemetry".to_string(),
                command_topic: "vehicle/command".to_string(),
                log_topic: "vehicle/log".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::localhost_defaults()
    }
}
