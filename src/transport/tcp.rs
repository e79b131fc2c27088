//! TCP pub/sub transport
//!
//! Frames are length-prefixed with a null-terminated topic:
//!
//! ```text
//! ┌──────────────────┬───────────────┬──────┬─────────────────────┐
//! │ Length (4 bytes) │ Topic (UTF-8) │ 0x00 │ Payload (variable)  │
//! │ Big-endian u32   │               │      │                     │
//! └──────────────────┴───────────────┴──────┴─────────────────────┘
//! ```
//!
//! The length covers topic, terminator and payload. Frames above 1MB are
//! rejected and the connection dropped. Topic filtering happens client-side:
//! a subscriber reads every frame on its connection and discards non-matching
//! topics.
//!
//! The transport context keeps a duplicate handle of every socket it hands
//! out. [`Transport::terminate`] flips the terminated flag and shuts all of
//! them down, so a receive loop blocked in `read_exact` wakes up with an
//! error that maps to [`Error::TransportTerminal`].

use crate::error::{Error, Result};
use crate::transport::{Frame, Publisher, Subscriber, Transport};
use parking_lot::Mutex;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Maximum accepted frame size (topic + payload)
const MAX_FRAME_SIZE: usize = 1024 * 1024;

struct Context {
    terminated: AtomicBool,
    // Duplicate handles of every endpoint socket, for teardown only
    sockets: Mutex<Vec<TcpStream>>,
}

impl Context {
    fn register(&self, stream: &TcpStream) -> Result<()> {
        let dup = stream.try_clone()?;
        self.sockets.lock().push(dup);
        Ok(())
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Map an endpoint I/O error to the bridge taxonomy
    fn classify(&self, err: std::io::Error) -> Error {
        use std::io::ErrorKind;
        if self.is_terminated() {
            return Error::TransportTerminal;
        }
        match err.kind() {
            // Remote side gone: nothing further will ever arrive
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe => Error::TransportTerminal,
            _ => Error::Io(err),
        }
    }
}

/// TCP transport sharing one teardown context across its endpoints
#[derive(Clone)]
pub struct TcpTransport {
    ctx: Arc<Context>,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self {
            ctx: Arc::new(Context {
                terminated: AtomicBool::new(false),
                sockets: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TcpTransport {
    fn publisher(&self, addr: &str) -> Result<Box<dyn Publisher>> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        self.ctx.register(&stream)?;
        log::info!("publish endpoint connected to {}", addr);
        Ok(Box::new(TcpPublisher {
            stream,
            ctx: Arc::clone(&self.ctx),
            closed: false,
        }))
    }

    fn subscriber(&self, addr: &str, topic: &str) -> Result<Box<dyn Subscriber>> {
        let stream = TcpStream::connect(addr)?;
        self.ctx.register(&stream)?;
        log::info!("subscribe endpoint connected to {} (topic {:?})", addr, topic);
        Ok(Box::new(TcpSubscriber {
            stream,
            topic: topic.to_string(),
            ctx: Arc::clone(&self.ctx),
            closed: false,
        }))
    }

    fn terminate(&self) {
        if self.ctx.terminated.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("tcp transport terminating");
        for socket in self.ctx.sockets.lock().iter() {
            let _ = socket.shutdown(Shutdown::Both);
        }
    }
}

struct TcpPublisher {
    stream: TcpStream,
    ctx: Arc<Context>,
    closed: bool,
}

impl Publisher for TcpPublisher {
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if self.closed || self.ctx.is_terminated() {
            return Err(Error::TransportTerminal);
        }
        let frame = encode_frame(topic, payload)?;
        self.stream
            .write_all(&frame)
            .map_err(|e| self.ctx.classify(e))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.stream.shutdown(Shutdown::Both);
        }
    }
}

struct TcpSubscriber {
    stream: TcpStream,
    topic: String,
    ctx: Arc<Context>,
    closed: bool,
}

impl Subscriber for TcpSubscriber {
    fn recv(&mut self) -> Result<Frame> {
        loop {
            if self.closed || self.ctx.is_terminated() {
                return Err(Error::TransportTerminal);
            }
            let frame = self.read_frame()?;
            if frame.topic == self.topic {
                return Ok(frame);
            }
            log::trace!("dropping frame for other topic {:?}", frame.topic);
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.stream.shutdown(Shutdown::Both);
        }
    }
}

impl TcpSubscriber {
    fn read_frame(&mut self) -> Result<Frame> {
        let mut len_buf = [0u8; 4];
        self.stream
            .read_exact(&mut len_buf)
            .map_err(|e| self.ctx.classify(e))?;
        let len = u32::from_be_bytes(len_buf) as usize;
        if len == 0 || len > MAX_FRAME_SIZE {
            self.close();
            return Err(Error::BadFrame(format!("frame length {} out of range", len)));
        }

        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .map_err(|e| self.ctx.classify(e))?;

        let Some(nul) = buf.iter().position(|&b| b == 0) else {
            self.close();
            return Err(Error::BadFrame("missing topic terminator".to_string()));
        };
        let topic = String::from_utf8_lossy(&buf[..nul]).into_owned();
        let payload = buf.split_off(nul + 1);
        Ok(Frame { topic, payload })
    }
}

/// Encode one wire frame: length prefix, topic, terminator, payload
pub(crate) fn encode_frame(topic: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let frame_len = topic.len() + 1 + payload.len();
    if frame_len > MAX_FRAME_SIZE {
        return Err(Error::BadFrame(format!("frame length {} out of range", frame_len)));
    }
    let mut buf = Vec::with_capacity(4 + frame_len);
    buf.extend_from_slice(&(frame_len as u32).to_be_bytes());
    buf.extend_from_slice(topic.as_bytes());
    buf.push(0);
    buf.extend_from_slice(payload);
    Ok(buf)
}
