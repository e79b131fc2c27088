//! Pub/sub transport abstraction
//!
//! A transport hands out publish and subscribe endpoints and owns a shared
//! context: terminating the context makes every blocking receive fail with
//! [`crate::Error::TransportTerminal`], which is how bridge shutdown
//! unblocks its receive loops.

use crate::error::Result;

pub mod mock;
pub mod tcp;

pub use mock::MockTransport;
pub use tcp::TcpTransport;

/// A topic plus payload pair, delivered atomically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Outbound endpoint. Not safe for concurrent sends; callers serialize.
pub trait Publisher: Send {
    /// Send one frame, fire-and-forget
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Close the endpoint; further sends fail. Idempotent.
    fn close(&mut self);
}

/// Inbound endpoint bound to one topic filter
pub trait Subscriber: Send {
    /// Block until the next frame matching the filter arrives.
    ///
    /// Fails with [`crate::Error::TransportTerminal`] once the context is
    /// torn down; that error is permanent.
    fn recv(&mut self) -> Result<Frame>;

    /// Close the endpoint. Idempotent.
    fn close(&mut self);
}

/// Factory for endpoints sharing one teardown context
pub trait Transport: Send + Sync {
    /// Connect an outbound endpoint
    fn publisher(&self, addr: &str) -> Result<Box<dyn Publisher>>;

    /// Connect an inbound endpoint filtered to `topic`
    fn subscriber(&self, addr: &str, topic: &str) -> Result<Box<dyn Subscriber>>;

    /// Tear down the context: unblock and permanently fail every endpoint.
    /// Idempotent and safe from any thread.
    fn terminate(&self);
}
