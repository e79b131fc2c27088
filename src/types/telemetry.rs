//! Vehicle telemetry snapshot

/// One vehicle's complete state at a point in time.
///
/// Produced by the bridge on every successful decode of a telemetry frame.
/// A newer snapshot fully replaces any prior snapshot for the same id;
/// fields are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    /// Vehicle id, stable for the session
    pub id: u8,
    /// Milliseconds since epoch at the sender
    pub timestamp: u64,
    /// Position (m), world frame
    pub pos: [f32; 3],
    /// Velocity (m/s), world frame
    pub vel: [f32; 3],
    /// Angular rate (rad/s), body frame
    pub omega: [f32; 3],
    /// Orientation quaternion [w, x, y, z]
    pub quat: [f32; 4],
    /// Controller thrust setpoint
    pub thrust_setpoint: f32,
    /// Controller angular-rate setpoint (rad/s)
    pub omega_setpoint: [f32; 3],
    /// Battery voltage (V)
    pub battery_voltage: f32,
    /// Hierarchical FSM status, one code per level (see [`crate::types::state`])
    pub fsm_state: [i32; 3],
    /// Thrust map estimate
    pub thrust_map: [f32; 3],
    /// Hover target position (m)
    pub hover_pos: [f32; 3],
    /// Hover target quaternion [w, x, y, z], yaw-only in practice
    pub hover_quat: [f32; 4],
}
