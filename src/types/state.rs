//! Vehicle controller FSM states
//!
//! The vehicle runs a three-level hierarchical state machine; telemetry
//! carries one state code per level. Codes outside the known range render
//! as `UNKNOWN` rather than failing the decode.

/// One level of the vehicle controller state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum VehicleState {
    NotConnected = 0,
    L0NonOffboard = 1,
    L0Offboard = 2,
    L0L1 = 3,
    L1Unarmed = 4,
    L1Armed = 5,
    L1L2 = 6,
    L2Idle = 7,
    L2TakingOff = 8,
    L2Hovering = 9,
    L2AllowCmdCtrl = 10,
    L2CmdCtrl = 11,
    L2Landing = 12,
    End = 13,
    Deadlock = 14,
}

impl VehicleState {
    /// Map a wire code to a state, if known
    pub fn from_code(code: i32) -> Option<Self> {
        use VehicleState::*;
        Some(match code {
            0 => NotConnected,
            1 => L0NonOffboard,
            2 => L0Offboard,
            3 => L0L1,
            4 => L1Unarmed,
            5 => L1Armed,
            6 => L1L2,
            7 => L2Idle,
            8 => L2TakingOff,
            9 => L2Hovering,
            10 => L2AllowCmdCtrl,
            11 => L2CmdCtrl,
            12 => L2Landing,
            13 => End,
            14 => Deadlock,
            _ => return None,
        })
    }

    /// Display name, matching the on-vehicle firmware spelling
    pub fn name(self) -> &'static str {
        use VehicleState::*;
        match self {
            NotConnected => "NOT_CONNECTED",
            L0NonOffboard => "L0_NON_OFFBOARD",
            L0Offboard => "L0_OFFBOARD",
            L0L1 => "L0_L1",
            L1Unarmed => "L1_UNARMED",
            L1Armed => "L1_ARMED",
            L1L2 => "L1_L2",
            L2Idle => "L2_IDLE",
            L2TakingOff => "L2_TAKING_OFF",
            L2Hovering => "L2_HOVERING",
            L2AllowCmdCtrl => "L2_ALLOW_CMD_CTRL",
            L2CmdCtrl => "L2_CMD_CTRL",
            L2Landing => "L2_LANDING",
            End => "END",
            Deadlock => "DEADLOCK",
        }
    }
}

/// Display name for a raw wire code
pub fn state_name(code: i32) -> &'static str {
    VehicleState::from_code(code)
        .map(VehicleState::name)
        .unwrap_or("UNKNOWN")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_state_has_a_name() {
        for code in 0..15 {
            let state = VehicleState::from_code(code).unwrap();
            assert_ne!(state.name(), "UNKNOWN");
            assert_eq!(state as i32, code);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert!(VehicleState::from_code(15).is_none());
        assert!(VehicleState::from_code(-1).is_none());
        assert_eq!(state_name(99), "UNKNOWN");
        assert_eq!(state_name(9), "L2_HOVERING");
    }
}
