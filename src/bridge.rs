//! Network bridge: pub/sub frames in, observable state out
//!
//! The bridge owns two background receive loops (telemetry and vehicle
//! logs) plus one guarded outbound publish path. Decoded telemetry and log
//! lines are fanned out through [`Observable`]s; consumers attach with
//! [`Observable::observe`] and read the latest with [`Observable::value`].
//!
//! Lifecycle is `Running → Draining → Closed`. The transition out of
//! Running happens exactly once, under the state lock, whether it is
//! initiated by [`Bridge::close`], by drop, or by a receive loop observing
//! transport teardown first.

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::observable::Observable;
use crate::transport::{Publisher, Subscriber, Transport};
use crate::types::{Command, TelemetrySnapshot};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeState {
    Running,
    Draining,
    Closed,
}

/// Client bridging a pub/sub transport to in-process observable state
pub struct Bridge {
    telemetry: Observable<TelemetrySnapshot>,
    log: Observable<String>,
    publisher: Arc<Mutex<Box<dyn Publisher>>>,
    state: Arc<Mutex<BridgeState>>,
    transport: Arc<dyn Transport>,
    command_topic: String,
    telemetry_thread: Mutex<Option<JoinHandle<()>>>,
    log_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Bridge {
    /// Open the three endpoints and start both receive loops
    pub fn connect(transport: Arc<dyn Transport>, config: &BridgeConfig) -> Result<Self> {
        let publisher = transport.publisher(&config.publish_address)?;
        let telemetry_sub =
            transport.subscriber(&config.subscribe_address, &config.telemetry_topic)?;
        let log_sub = transport.subscriber(&config.subscribe_address, &config.log_topic)?;

        let telemetry = Observable::new();
        let log = Observable::new();
        let state = Arc::new(Mutex::new(BridgeState::Running));

        let telemetry_thread = thread::Builder::new().name("telemetry-recv".to_string()).spawn({
            let observable = telemetry.clone();
            let state = Arc::clone(&state);
            let transport = Arc::clone(&transport);
            move || Self::telemetry_loop(telemetry_sub, observable, state, transport)
        })?;

        let log_thread = thread::Builder::new().name("log-recv".to_string()).spawn({
            let observable = log.clone();
            let state = Arc::clone(&state);
            let transport = Arc::clone(&transport);
            move || Self::log_loop(log_sub, observable, state, transport)
        })?;

        log::info!("bridge running");
        Ok(Self {
            telemetry,
            log,
            publisher: Arc::new(Mutex::new(publisher)),
            state,
            transport,
            command_topic: config.command_topic.clone(),
            telemetry_thread: Mutex::new(Some(telemetry_thread)),
            log_thread: Mutex::new(Some(log_thread)),
        })
    }

    /// Telemetry observable: latest [`TelemetrySnapshot`] per post
    pub fn telemetry(&self) -> Observable<TelemetrySnapshot> {
        self.telemetry.clone()
    }

    /// Log observable: latest vehicle log line per post
    pub fn log(&self) -> Observable<String> {
        self.log.clone()
    }

    /// Whether the bridge still accepts publishes
    pub fn is_running(&self) -> bool {
        *self.state.lock() == BridgeState::Running
    }

    /// Serialize and send one command frame.
    ///
    /// Fails with [`Error::BridgeClosed`] without touching the socket once
    /// the bridge has left the Running state. Concurrent callers are
    /// serialized on the publisher lock.
    pub fn publish(&self, command: &Command) -> Result<()> {
        if *self.state.lock() != BridgeState::Running {
            return Err(Error::BridgeClosed);
        }
        let payload = command.encode();
        self.publisher.lock().send(&self.command_topic, &payload)
    }

    /// Shut down: drain, unblock both loops, and join them.
    ///
    /// Idempotent; does not return while either loop is still executing.
    pub fn close(&self) {
        if Self::drain(&self.state, self.transport.as_ref()) {
            log::info!("bridge draining");
        }
        if let Some(handle) = self.telemetry_thread.lock().take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.log_thread.lock().take() {
            let _ = handle.join();
        }
        self.publisher.lock().close();
        *self.state.lock() = BridgeState::Closed;
    }

    /// One-time Running → Draining transition plus transport teardown.
    ///
    /// Serialized on the state lock so concurrent loop-exit detection and
    /// an explicit close race to a single winner; only the winner tears the
    /// transport down. Returns whether this caller won.
    fn drain(state: &Mutex<BridgeState>, transport: &dyn Transport) -> bool {
        {
            let mut state = state.lock();
            if *state != BridgeState::Running {
                return false;
            }
            *state = BridgeState::Draining;
        }
        transport.terminate();
        true
    }

    fn telemetry_loop(
        mut sub: Box<dyn Subscriber>,
        observable: Observable<TelemetrySnapshot>,
        state: Arc<Mutex<BridgeState>>,
        transport: Arc<dyn Transport>,
    ) {
        loop {
            match sub.recv() {
                Ok(frame) => match TelemetrySnapshot::decode(&frame.payload) {
                    Ok(snapshot) => observable.post(snapshot),
                    Err(e) => log::warn!("telemetry frame dropped: {}", e),
                },
                Err(Error::TransportTerminal) => {
                    if Self::drain(&state, transport.as_ref()) {
                        log::info!("telemetry loop observed transport teardown");
                    }
                    sub.close();
                    break;
                }
                // Transient receive errors must not kill the loop
                Err(e) => log::error!("telemetry recv error: {}", e),
            }
        }
        log::info!("telemetry receive loop exited");
    }

    fn log_loop(
        mut sub: Box<dyn Subscriber>,
        observable: Observable<String>,
        state: Arc<Mutex<BridgeState>>,
        transport: Arc<dyn Transport>,
    ) {
        loop {
            match sub.recv() {
                Ok(frame) => {
                    observable.post(String::from_utf8_lossy(&frame.payload).into_owned());
                }
                Err(Error::TransportTerminal) => {
                    if Self::drain(&state, transport.as_ref()) {
                        log::info!("log loop observed transport teardown");
                    }
                    sub.close();
                    break;
                }
                Err(e) => log::error!("log recv error: {}", e),
            }
        }
        log::info!("log receive loop exited");
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.close();
        log::info!("bridge closed");
    }
}
