//! Outbound vehicle commands

use crate::types::time::now_millis;

/// Size of the opaque command data buffer
pub const COMMAND_DATA_SIZE: usize = 64;

/// Discrete command codes, wire ordinals 0..=9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CommandKind {
    Heartbeat = 0,
    Arm = 1,
    EnterOffboard = 2,
    ExitOffboard = 3,
    Takeoff = 4,
    Land = 5,
    ForceHover = 6,
    AllowCmdCtrl = 7,
    ForceDisarm = 8,
    ChangeHoverPos = 9,
}

impl CommandKind {
    /// Every command, in ordinal order
    pub const ALL: [CommandKind; 10] = [
        CommandKind::Heartbeat,
        CommandKind::Arm,
        CommandKind::EnterOffboard,
        CommandKind::ExitOffboard,
        CommandKind::Takeoff,
        CommandKind::Land,
        CommandKind::ForceHover,
        CommandKind::AllowCmdCtrl,
        CommandKind::ForceDisarm,
        CommandKind::ChangeHoverPos,
    ];

    /// Map a wire code to a command, if known
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Heartbeat => "HEARTBEAT",
            CommandKind::Arm => "ARM",
            CommandKind::EnterOffboard => "ENTER_OFFBOARD",
            CommandKind::ExitOffboard => "EXIT_OFFBOARD",
            CommandKind::Takeoff => "TAKEOFF",
            CommandKind::Land => "LAND",
            CommandKind::ForceHover => "FORCE_HOVER",
            CommandKind::AllowCmdCtrl => "ALLOW_CMD_CTRL",
            CommandKind::ForceDisarm => "FORCE_DISARM",
            CommandKind::ChangeHoverPos => "CHANGE_HOVER_POS",
        }
    }
}

/// One outbound command frame payload.
///
/// Fire-and-forget: serialized, handed to the bridge, never retained.
/// `data` is opaque; only [`CommandKind::ChangeHoverPos`] uses it, packing
/// a position 3-vector plus a quaternion as seven little-endian f64s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// Target vehicle id
    pub id: u8,
    /// Send time, milliseconds since epoch
    pub timestamp: u64,
    /// Command code
    pub kind: CommandKind,
    /// Opaque payload
    pub data: [u8; COMMAND_DATA_SIZE],
}

impl Command {
    /// New command with the current send time and empty data
    pub fn new(kind: CommandKind, id: u8) -> Self {
        Self {
            id,
            timestamp: now_millis(),
            kind,
            data: [0; COMMAND_DATA_SIZE],
        }
    }

    /// Hover-target change for one vehicle.
    ///
    /// `quat` is `[w, x, y, z]`, yaw-only in practice (see
    /// [`crate::types::quat::from_yaw`]).
    pub fn change_hover_pos(id: u8, pos: [f64; 3], quat: [f64; 4]) -> Self {
        let mut data = [0u8; COMMAND_DATA_SIZE];
        for (i, v) in pos.iter().chain(quat.iter()).enumerate() {
            data[i * 8..i * 8 + 8].copy_from_slice(&v.to_le_bytes());
        }
        Self {
            id,
            timestamp: now_millis(),
            kind: CommandKind::ChangeHoverPos,
            data,
        }
    }

    /// Recover the packed hover target, for ChangeHoverPos commands only
    pub fn hover_pose(&self) -> Option<([f64; 3], [f64; 4])> {
        if self.kind != CommandKind::ChangeHoverPos {
            return None;
        }
        let mut vals = [0f64; 7];
        for (i, v) in vals.iter_mut().enumerate() {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&self.data[i * 8..i * 8 + 8]);
            *v = f64::from_le_bytes(raw);
        }
        Some((
            [vals[0], vals[1], vals[2]],
            [vals[3], vals[4], vals[5], vals[6]],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::quat;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_code_round_trip() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_code(kind as u32), Some(kind));
        }
        assert_eq!(CommandKind::from_code(10), None);
    }

    #[test]
    fn test_name_table_complete() {
        for kind in CommandKind::ALL {
            assert!(!kind.name().is_empty());
        }
        assert_eq!(CommandKind::ChangeHoverPos.name(), "CHANGE_HOVER_POS");
    }

    #[test]
    fn test_hover_pose_round_trip() {
        let q = quat::from_yaw(FRAC_PI_2);
        let cmd = Command::change_hover_pos(3, [4.0, 5.0, 6.0], q);
        let (pos, quat) = cmd.hover_pose().unwrap();
        assert_eq!(pos, [4.0, 5.0, 6.0]);
        for i in 0..4 {
            assert!((quat[i] - q[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hover_pose_wrong_kind() {
        assert!(Command::new(CommandKind::Land, 1).hover_pose().is_none());
    }
}
