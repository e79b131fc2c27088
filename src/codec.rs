//! Fixed-layout binary codec for telemetry and command frames
//!
//! Telemetry payload (133 bytes, little-endian, no padding):
//!
//! ```text
//! [id u8] [timestamp u64] [pos 3xf32] [vel 3xf32] [omega 3xf32] [quat 4xf32]
//! [thrust_setpoint f32] [omega_setpoint 3xf32] [battery_voltage f32]
//! [fsm_state 3xi32] [thrust_map 3xf32] [hover_pos 3xf32] [hover_quat 4xf32]
//! ```
//!
//! Command payload (77 bytes):
//!
//! ```text
//! [id u8] [timestamp u64] [command u32] [data 64 bytes]
//! ```
//!
//! Wire compatibility is by construction: both ends carry the identical
//! fixed layout, and a length mismatch fails the decode outright. There is
//! no versioning.

use crate::error::{Error, Result};
use crate::types::{Command, CommandKind, TelemetrySnapshot, COMMAND_DATA_SIZE};

/// Fixed width of a telemetry payload
pub const TELEMETRY_WIRE_SIZE: usize = 133;
/// Fixed width of a command payload
pub const COMMAND_WIRE_SIZE: usize = 1 + 8 + 4 + COMMAND_DATA_SIZE;

/// Little-endian field reader over a length-checked buffer
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self) -> u8 {
        let v = self.buf[self.pos];
        self.pos += 1;
        v
    }

    fn u32(&mut self) -> u32 {
        let p = self.pos;
        self.pos += 4;
        u32::from_le_bytes([self.buf[p], self.buf[p + 1], self.buf[p + 2], self.buf[p + 3]])
    }

    fn i32(&mut self) -> i32 {
        self.u32() as i32
    }

    fn u64(&mut self) -> u64 {
        let p = self.pos;
        self.pos += 8;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.buf[p..p + 8]);
        u64::from_le_bytes(raw)
    }

    fn f32(&mut self) -> f32 {
        f32::from_bits(self.u32())
    }

    fn f32x3(&mut self) -> [f32; 3] {
        [self.f32(), self.f32(), self.f32()]
    }

    fn f32x4(&mut self) -> [f32; 4] {
        [self.f32(), self.f32(), self.f32(), self.f32()]
    }

    fn i32x3(&mut self) -> [i32; 3] {
        [self.i32(), self.i32(), self.i32()]
    }
}

/// Little-endian field writer
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }

    fn f32s(&mut self, vs: &[f32]) {
        for v in vs {
            self.f32(*v);
        }
    }

    fn i32s(&mut self, vs: &[i32]) {
        for v in vs {
            self.u32(*v as u32);
        }
    }
}

impl TelemetrySnapshot {
    /// Serialize to the fixed 133-byte wire layout
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(TELEMETRY_WIRE_SIZE);
        w.u8(self.id);
        w.u64(self.timestamp);
        w.f32s(&self.pos);
        w.f32s(&self.vel);
        w.f32s(&self.omega);
        w.f32s(&self.quat);
        w.f32(self.thrust_setpoint);
        w.f32s(&self.omega_setpoint);
        w.f32(self.battery_voltage);
        w.i32s(&self.fsm_state);
        w.f32s(&self.thrust_map);
        w.f32s(&self.hover_pos);
        w.f32s(&self.hover_quat);
        debug_assert_eq!(w.buf.len(), TELEMETRY_WIRE_SIZE);
        w.buf
    }

    /// Decode from the fixed wire layout.
    ///
    /// Fails with [`Error::SizeMismatch`] on any other length and constructs
    /// nothing on failure.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != TELEMETRY_WIRE_SIZE {
            return Err(Error::SizeMismatch {
                expected: TELEMETRY_WIRE_SIZE,
                actual: buf.len(),
            });
        }
        let mut r = Reader::new(buf);
        Ok(Self {
            id: r.u8(),
            timestamp: r.u64(),
            pos: r.f32x3(),
            vel: r.f32x3(),
            omega: r.f32x3(),
            quat: r.f32x4(),
            thrust_setpoint: r.f32(),
            omega_setpoint: r.f32x3(),
            battery_voltage: r.f32(),
            fsm_state: r.i32x3(),
            thrust_map: r.f32x3(),
            hover_pos: r.f32x3(),
            hover_quat: r.f32x4(),
        })
    }
}

impl Command {
    /// Serialize to the fixed 77-byte wire layout
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(COMMAND_WIRE_SIZE);
        w.u8(self.id);
        w.u64(self.timestamp);
        w.u32(self.kind as u32);
        w.buf.extend_from_slice(&self.data);
        debug_assert_eq!(w.buf.len(), COMMAND_WIRE_SIZE);
        w.buf
    }

    /// Decode from the fixed wire layout.
    ///
    /// Fails with [`Error::SizeMismatch`] on a wrong length and
    /// [`Error::BadFrame`] on an unknown command code.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != COMMAND_WIRE_SIZE {
            return Err(Error::SizeMismatch {
                expected: COMMAND_WIRE_SIZE,
                actual: buf.len(),
            });
        }
        let mut r = Reader::new(buf);
        let id = r.u8();
        let timestamp = r.u64();
        let code = r.u32();
        let kind = CommandKind::from_code(code)
            .ok_or_else(|| Error::BadFrame(format!("unknown command code {}", code)))?;
        let mut data = [0u8; COMMAND_DATA_SIZE];
        data.copy_from_slice(&buf[r.pos..]);
        Ok(Self {
            id,
            timestamp,
            kind,
            data,
        })
    }
}
