//! Consumer-side fleet state accumulator
//!
//! [`FleetMonitor`] is the in-process stand-in for a UI adapter: it attaches
//! to both bridge observables, keeps the latest snapshot per vehicle id and
//! an append-only log buffer, and issues fire-and-forget commands back
//! through the bridge. Callbacks run on the bridge receive threads while a
//! renderer thread reads, so the accumulated state sits behind a lock.

use crate::bridge::Bridge;
use crate::observable::Subscription;
use crate::types::{quat, Command, CommandKind, TelemetrySnapshot};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct MonitorShared {
    // Latest snapshot per vehicle id, last-write-wins
    vehicles: BTreeMap<u8, TelemetrySnapshot>,
    // Unbounded by design; external collaborators may cap or rotate
    logs: Vec<String>,
}

/// Fleet state accumulator and command issuer
pub struct FleetMonitor {
    bridge: Arc<Bridge>,
    shared: Arc<Mutex<MonitorShared>>,
    // Held for the monitor's lifetime; dropping them deregisters
    _telemetry_sub: Subscription,
    _log_sub: Subscription,
}

impl FleetMonitor {
    /// Attach to both of the bridge's observables
    pub fn new(bridge: Arc<Bridge>) -> Self {
        let shared = Arc::new(Mutex::new(MonitorShared::default()));

        let telemetry_shared = Arc::clone(&shared);
        let telemetry_sub = bridge.telemetry().observe(move |snapshot: &TelemetrySnapshot| {
            telemetry_shared.lock().vehicles.insert(snapshot.id, *snapshot);
        });

        let log_shared = Arc::clone(&shared);
        let log_sub = bridge.log().observe(move |line: &String| {
            log_shared.lock().logs.push(line.clone());
        });

        Self {
            bridge,
            shared,
            _telemetry_sub: telemetry_sub,
            _log_sub: log_sub,
        }
    }

    /// Latest snapshot of every known vehicle, in id order
    pub fn vehicles(&self) -> Vec<TelemetrySnapshot> {
        self.shared.lock().vehicles.values().copied().collect()
    }

    /// Latest snapshot for one vehicle
    pub fn vehicle(&self, id: u8) -> Option<TelemetrySnapshot> {
        self.shared.lock().vehicles.get(&id).copied()
    }

    /// All accumulated log lines
    pub fn logs(&self) -> Vec<String> {
        self.shared.lock().logs.clone()
    }

    /// Number of accumulated log lines
    pub fn log_count(&self) -> usize {
        self.shared.lock().logs.len()
    }

    /// Log lines appended since index `from`
    pub fn logs_since(&self, from: usize) -> Vec<String> {
        let shared = self.shared.lock();
        shared.logs.get(from..).map(<[String]>::to_vec).unwrap_or_default()
    }

    /// Send a discrete command to one vehicle.
    ///
    /// Fire-and-forget: a closed bridge is logged, never fatal.
    pub fn send_command(&self, kind: CommandKind, id: u8) {
        if let Err(e) = self.bridge.publish(&Command::new(kind, id)) {
            log::warn!("command {} to vehicle {} not sent: {}", kind.name(), id, e);
        }
    }

    /// Move a vehicle's hover target by a body-frame position delta and a
    /// yaw delta.
    ///
    /// The position delta is rotated into the world frame by the vehicle's
    /// current orientation, then added to its current hover target; the yaw
    /// delta is applied to the hover quaternion's yaw. Needs at least one
    /// received snapshot for the vehicle.
    pub fn nudge_hover(&self, id: u8, delta_body: [f64; 3], delta_yaw: f64) {
        let Some(snapshot) = self.vehicle(id) else {
            log::warn!("no telemetry yet for vehicle {}, hover change dropped", id);
            return;
        };

        let attitude = [
            snapshot.quat[0] as f64,
            snapshot.quat[1] as f64,
            snapshot.quat[2] as f64,
            snapshot.quat[3] as f64,
        ];
        let delta_world = quat::rotate(attitude, delta_body);

        let hover_pos = [
            snapshot.hover_pos[0] as f64 + delta_world[0],
            snapshot.hover_pos[1] as f64 + delta_world[1],
            snapshot.hover_pos[2] as f64 + delta_world[2],
        ];
        let hover_yaw = quat::to_yaw([
            snapshot.hover_quat[0] as f64,
            snapshot.hover_quat[1] as f64,
            snapshot.hover_quat[2] as f64,
            snapshot.hover_quat[3] as f64,
        ]) + delta_yaw;

        let command = Command::change_hover_pos(id, hover_pos, quat::from_yaw(hover_yaw));
        if let Err(e) = self.bridge.publish(&command) {
            log::warn!("hover change for vehicle {} not sent: {}", id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::transport::MockTransport;
    use crossbeam_channel::bounded;
    use std::f64::consts::FRAC_PI_2;
    use std::time::Duration;

    fn test_config() -> BridgeConfig {
        BridgeConfig {
            publish_address: "mock-pub".to_string(),
            subscribe_address: "mock-sub".to_string(),
            telemetry_topic: "vehicle/telemetry".to_string(),
            command_topic: "vehicle/command".to_string(),
            log_topic: "vehicle/log".to_string(),
        }
    }

    fn setup(mock: &MockTransport) -> (Arc<Bridge>, FleetMonitor) {
        let bridge = Arc::new(Bridge::connect(Arc::new(mock.clone()), &test_config()).unwrap());
        let monitor = FleetMonitor::new(Arc::clone(&bridge));
        (bridge, monitor)
    }

    /// Inject a snapshot and wait until the monitor has processed it.
    ///
    /// The monitor registered first, so its callback runs before the probe's
    /// for each post.
    fn inject_and_wait(mock: &MockTransport, bridge: &Bridge, snapshot: &TelemetrySnapshot) {
        let (tx, rx) = bounded(1);
        let probe = bridge.telemetry().observe(move |s: &TelemetrySnapshot| {
            let _ = tx.send(s.id);
        });
        mock.inject("vehicle/telemetry", &snapshot.encode());
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        probe.unobserve();
    }

    #[test]
    fn test_upsert_per_vehicle_id() {
        let mock = MockTransport::new();
        let (bridge, monitor) = setup(&mock);

        let snap3 = TelemetrySnapshot {
            id: 3,
            pos: [1.0, 2.0, 3.0],
            ..Default::default()
        };
        inject_and_wait(&mock, &bridge, &snap3);

        let snap5 = TelemetrySnapshot {
            id: 5,
            ..Default::default()
        };
        inject_and_wait(&mock, &bridge, &snap5);

        assert_eq!(monitor.vehicles().len(), 2);
        assert_eq!(monitor.vehicle(3).unwrap().pos, [1.0, 2.0, 3.0]);
        assert_eq!(bridge.telemetry().value(), snap5);

        // Same id again: replaced, not merged
        let snap3b = TelemetrySnapshot {
            id: 3,
            pos: [9.0, 9.0, 9.0],
            ..Default::default()
        };
        inject_and_wait(&mock, &bridge, &snap3b);
        assert_eq!(monitor.vehicles().len(), 2);
        assert_eq!(monitor.vehicle(3).unwrap().pos, [9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_log_accumulation() {
        let mock = MockTransport::new();
        let (bridge, monitor) = setup(&mock);

        let (tx, rx) = bounded(4);
        let probe = bridge.log().observe(move |line: &String| {
            let _ = tx.send(line.clone());
        });
        mock.inject("vehicle/log", b"takeoff");
        mock.inject("vehicle/log", b"hovering");
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        probe.unobserve();

        assert_eq!(monitor.logs(), vec!["takeoff".to_string(), "hovering".to_string()]);
        assert_eq!(monitor.logs_since(1), vec!["hovering".to_string()]);
        assert_eq!(monitor.log_count(), 2);
    }

    #[test]
    fn test_nudge_hover_rotates_and_offsets() {
        let mock = MockTransport::new();
        let (bridge, monitor) = setup(&mock);

        // Identity attitude, hover target at (4,5,6) facing yaw 0
        let snap = TelemetrySnapshot {
            id: 3,
            quat: [1.0, 0.0, 0.0, 0.0],
            hover_pos: [4.0, 5.0, 6.0],
            hover_quat: [1.0, 0.0, 0.0, 0.0],
            ..Default::default()
        };
        inject_and_wait(&mock, &bridge, &snap);

        monitor.nudge_hover(3, [1.0, 0.0, 0.0], FRAC_PI_2);

        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        let command = Command::decode(&sent[0].payload).unwrap();
        assert_eq!(command.kind, CommandKind::ChangeHoverPos);
        assert_eq!(command.id, 3);

        let (pos, q) = command.hover_pose().unwrap();
        assert!((pos[0] - 5.0).abs() < 1e-9);
        assert!((pos[1] - 5.0).abs() < 1e-9);
        assert!((pos[2] - 6.0).abs() < 1e-9);
        let expect = quat::from_yaw(FRAC_PI_2);
        for i in 0..4 {
            assert!((q[i] - expect[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nudge_without_telemetry_sends_nothing() {
        let mock = MockTransport::new();
        let (_bridge, monitor) = setup(&mock);
        monitor.nudge_hover(7, [1.0, 0.0, 0.0], 0.0);
        assert_eq!(mock.sent_count(), 0);
    }

    #[test]
    fn test_send_command_after_close_is_nonfatal() {
        let mock = MockTransport::new();
        let (bridge, monitor) = setup(&mock);
        bridge.close();
        monitor.send_command(CommandKind::ForceDisarm, 1);
        assert_eq!(mock.sent_count(), 0);
    }
}
