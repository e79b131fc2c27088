//! Common data types

pub mod command;
pub mod quat;
pub mod state;
pub mod telemetry;
pub mod time;

pub use command::*;
pub use state::*;
pub use telemetry::*;
