//! In-memory transport for hardware-free testing
//!
//! Frames injected with [`MockTransport::inject`] flow to matching
//! subscribers through unbounded channels; everything published is recorded
//! and readable back with [`MockTransport::sent`]. Terminating the transport
//! drops the channel senders, so blocked receives fail with
//! [`crate::Error::TransportTerminal`] just like a real teardown.

use crate::error::{Error, Result};
use crate::transport::{Frame, Publisher, Subscriber, Transport};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct MockInner {
    subscribers: Vec<(String, Sender<Frame>)>,
    sent: Vec<Frame>,
    terminated: bool,
}

/// Mock pub/sub transport
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a frame to every subscriber filtered to `topic`
    pub fn inject(&self, topic: &str, payload: &[u8]) {
        let inner = self.inner.lock();
        for (t, tx) in &inner.subscribers {
            if t == topic {
                let _ = tx.send(Frame {
                    topic: topic.to_string(),
                    payload: payload.to_vec(),
                });
            }
        }
    }

    /// Every frame published so far, in send order
    pub fn sent(&self) -> Vec<Frame> {
        self.inner.lock().sent.clone()
    }

    /// Number of frames published so far
    pub fn sent_count(&self) -> usize {
        self.inner.lock().sent.len()
    }
}

impl Transport for MockTransport {
    fn publisher(&self, _addr: &str) -> Result<Box<dyn Publisher>> {
        Ok(Box::new(MockPublisher {
            inner: Arc::clone(&self.inner),
        }))
    }

    fn subscriber(&self, _addr: &str, topic: &str) -> Result<Box<dyn Subscriber>> {
        let (tx, rx) = unbounded();
        let mut inner = self.inner.lock();
        if inner.terminated {
            return Err(Error::TransportTerminal);
        }
        inner.subscribers.push((topic.to_string(), tx));
        Ok(Box::new(MockSubscriber { rx }))
    }

    fn terminate(&self) {
        let mut inner = self.inner.lock();
        inner.terminated = true;
        // Dropping the senders wakes every blocked recv with a terminal error
        inner.subscribers.clear();
    }
}

struct MockPublisher {
    inner: Arc<Mutex<MockInner>>,
}

impl Publisher for MockPublisher {
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.terminated {
            return Err(Error::TransportTerminal);
        }
        inner.sent.push(Frame {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn close(&mut self) {}
}

struct MockSubscriber {
    rx: Receiver<Frame>,
}

impl Subscriber for MockSubscriber {
    fn recv(&mut self) -> Result<Frame> {
        self.rx.recv().map_err(|_| Error::TransportTerminal)
    }

    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_inject_reaches_matching_subscriber_only() {
        let transport = MockTransport::new();
        let mut telemetry = transport.subscriber("", "telemetry").unwrap();
        let _logs = transport.subscriber("", "logs").unwrap();

        transport.inject("telemetry", &[42]);
        let frame = telemetry.recv().unwrap();
        assert_eq!(frame.topic, "telemetry");
        assert_eq!(frame.payload, vec![42]);
    }

    #[test]
    fn test_publish_is_recorded() {
        let transport = MockTransport::new();
        let mut publisher = transport.publisher("").unwrap();
        publisher.send("cmd", &[1, 2]).unwrap();
        assert_eq!(transport.sent_count(), 1);
        assert_eq!(transport.sent()[0].payload, vec![1, 2]);
    }

    #[test]
    fn test_terminate_unblocks_recv() {
        let transport = MockTransport::new();
        let mut sub = transport.subscriber("", "telemetry").unwrap();
        let t = transport.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            t.terminate();
        });
        assert!(matches!(sub.recv(), Err(Error::TransportTerminal)));
        assert!(matches!(
            transport.publisher("").unwrap().send("cmd", &[]),
            Err(Error::TransportTerminal)
        ));
    }
}
