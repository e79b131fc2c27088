//! SetuGCS - Ground-control telemetry bridge for remote vehicles
//!
//! Receives periodic state telemetry and free-text log lines over a
//! pub/sub transport, republishes each decoded value through thread-safe
//! observables, and pushes discrete commands back to the vehicles.
//!
//! Core pieces:
//!
//! - [`Bridge`]: persistent background receive loops plus a guarded
//!   outbound publish path
//! - [`Observable`]: single-slot broadcaster with handle-based listener
//!   registration
//! - [`FleetMonitor`]: consumer-side accumulator of per-vehicle snapshots
//!   and log history
//!
//! Rendering, window management and signal handling are external
//! collaborators; they only consume the bridge's public interface.

pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod monitor;
pub mod observable;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use bridge::Bridge;
pub use config::{AppConfig, BridgeConfig};
pub use error::{Error, Result};
pub use monitor::FleetMonitor;
pub use observable::{Observable, Subscription};
pub use types::{Command, CommandKind, TelemetrySnapshot};
