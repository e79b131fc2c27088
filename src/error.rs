//! Error types for the ground-control bridge

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame payload length differs from the fixed wire width
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Fixed wire width of the expected structure
        expected: usize,
        /// Length of the received payload
        actual: usize,
    },

    /// Frame decoded but carried an invalid field (e.g. unknown command code)
    #[error("bad frame: {0}")]
    BadFrame(String),

    /// Transport context is being torn down; blocking receives will not recover
    #[error("transport terminated")]
    TransportTerminal,

    /// Publish attempted after the bridge left the Running state
    #[error("bridge is closed")]
    BridgeClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
