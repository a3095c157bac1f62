// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MAVLink messages spoken by the tracker.
//!
//! Only the handful of messages the gimbal manager needs are defined. Every payload is encoded
//! little-endian in MAVLink wire order (fields sorted by size, largest first). Decoding reads past
//! the received length as zero, which is how MAVLink 2 payload truncation is undone.

use super::Error;

// Identity
pub const MAV_COMP_ID_GIMBAL: u8 = 154;

// MAV_TYPE / MAV_AUTOPILOT / MAV_MODE_FLAG / MAV_STATE
pub const MAV_TYPE_ANTENNA_TRACKER: u8 = 5;
pub const MAV_AUTOPILOT_INVALID: u8 = 8;
pub const MAV_MODE_FLAG_SAFETY_ARMED: u8 = 128;
pub const MAV_STATE_ACTIVE: u8 = 4;
pub const MAVLINK_VERSION: u8 = 3;

// MAV_CMD
pub const MAV_CMD_REQUEST_MESSAGE: u16 = 512;
pub const MAV_CMD_DO_GIMBAL_MANAGER_CONFIGURE: u16 = 1001;

// GIMBAL_MANAGER_CAP_FLAGS
pub const GIMBAL_MANAGER_CAP_FLAGS_HAS_PITCH_AXIS: u32 = 32;
pub const GIMBAL_MANAGER_CAP_FLAGS_HAS_PITCH_LOCK: u32 = 128;
pub const GIMBAL_MANAGER_CAP_FLAGS_HAS_YAW_AXIS: u32 = 256;
pub const GIMBAL_MANAGER_CAP_FLAGS_HAS_YAW_LOCK: u32 = 1024;
pub const GIMBAL_MANAGER_CAP_FLAGS_SUPPORTS_INFINITE_YAW: u32 = 2048;

// GIMBAL_MANAGER_FLAGS / GIMBAL_DEVICE_FLAGS (same bit values)
pub const GIMBAL_FLAGS_PITCH_LOCK: u32 = 8;
pub const GIMBAL_FLAGS_YAW_LOCK: u32 = 16;

/// MAV_RESULT
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MavResult {
    Accepted = 0,
    TemporarilyRejected = 1,
    Denied = 2,
    Unsupported = 3,
    Failed = 4,
    InProgress = 5,
    Cancelled = 6,
}

impl TryFrom<u8> for MavResult {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        Ok(match v {
            0 => MavResult::Accepted,
            1 => MavResult::TemporarilyRejected,
            2 => MavResult::Denied,
            3 => MavResult::Unsupported,
            4 => MavResult::Failed,
            5 => MavResult::InProgress,
            6 => MavResult::Cancelled,
            other => return Err(Error::InvalidEnum(other as u32)),
        })
    }
}

/// A message with a fixed id, CRC seed and base payload length.
pub trait Message: Sized {
    const ID: u32;
    const CRC_EXTRA: u8;
    /// Untruncated payload length.
    const LEN: usize;

    /// Write the full `LEN`-byte payload into `buf`.
    fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.len() < Self::LEN {
            return Err(Error::BufferTooSmall);
        }
        let mut w = Writer::new(&mut buf[..Self::LEN]);
        self.write(&mut w);
        Ok(Self::LEN)
    }

    /// Read a payload. Missing trailing bytes read as zero.
    fn decode(payload: &[u8]) -> Result<Self, Error> {
        Self::read(&mut Reader::new(payload))
    }

    fn write(&self, w: &mut Writer<'_>);
    fn read(r: &mut Reader<'_>) -> Result<Self, Error>;
}

/// CRC seed and base length for a message id this firmware understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MessageInfo {
    pub crc_extra: u8,
    pub len: usize,
}

pub fn lookup(msgid: u32) -> Option<MessageInfo> {
    fn info<M: Message>() -> MessageInfo {
        MessageInfo {
            crc_extra: M::CRC_EXTRA,
            len: M::LEN,
        }
    }
    Some(match msgid {
        Heartbeat::ID => info::<Heartbeat>(),
        CommandLong::ID => info::<CommandLong>(),
        CommandAck::ID => info::<CommandAck>(),
        GimbalManagerInformation::ID => info::<GimbalManagerInformation>(),
        GimbalManagerStatus::ID => info::<GimbalManagerStatus>(),
        GimbalManagerSetAttitude::ID => info::<GimbalManagerSetAttitude>(),
        GimbalDeviceAttitudeStatus::ID => info::<GimbalDeviceAttitudeStatus>(),
        _ => return None,
    })
}

/// Little-endian field writer. The caller sizes the buffer to the payload length.
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, b: &[u8]) {
        let end = (self.pos + b.len()).min(self.buf.len());
        let n = end - self.pos;
        self.buf[self.pos..end].copy_from_slice(&b[..n]);
        self.pos = end;
    }

    pub fn u8(&mut self, v: u8) {
        self.bytes(&[v]);
    }
    pub fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }
    pub fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }
    pub fn i32(&mut self, v: i32) {
        self.bytes(&v.to_le_bytes());
    }
    pub fn f32(&mut self, v: f32) {
        self.bytes(&v.to_le_bytes());
    }
}

/// Little-endian field reader that yields zeros past the end of the payload.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        for b in out.iter_mut() {
            *b = self.buf.get(self.pos).copied().unwrap_or(0);
            self.pos += 1;
        }
        out
    }

    pub fn u8(&mut self) -> u8 {
        self.array::<1>()[0]
    }
    pub fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.array())
    }
    pub fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }
    pub fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.array())
    }
    pub fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.array())
    }
}

/// HEARTBEAT (#0)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: u8,
    pub mavlink_version: u8,
}

impl Heartbeat {
    /// The tracker's own heartbeat.
    pub const TRACKER: Self = Self {
        custom_mode: 0,
        mav_type: MAV_TYPE_ANTENNA_TRACKER,
        autopilot: MAV_AUTOPILOT_INVALID,
        base_mode: MAV_MODE_FLAG_SAFETY_ARMED,
        system_status: MAV_STATE_ACTIVE,
        mavlink_version: MAVLINK_VERSION,
    };
}

impl Message for Heartbeat {
    const ID: u32 = 0;
    const CRC_EXTRA: u8 = 50;
    const LEN: usize = 9;

    fn write(&self, w: &mut Writer<'_>) {
        w.u32(self.custom_mode);
        w.u8(self.mav_type);
        w.u8(self.autopilot);
        w.u8(self.base_mode);
        w.u8(self.system_status);
        w.u8(self.mavlink_version);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            custom_mode: r.u32(),
            mav_type: r.u8(),
            autopilot: r.u8(),
            base_mode: r.u8(),
            system_status: r.u8(),
            mavlink_version: r.u8(),
        })
    }
}

/// COMMAND_LONG (#76)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CommandLong {
    /// `param1` through `param7`.
    pub params: [f32; 7],
    pub command: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub confirmation: u8,
}

impl Message for CommandLong {
    const ID: u32 = 76;
    const CRC_EXTRA: u8 = 152;
    const LEN: usize = 33;

    fn write(&self, w: &mut Writer<'_>) {
        for p in self.params {
            w.f32(p);
        }
        w.u16(self.command);
        w.u8(self.target_system);
        w.u8(self.target_component);
        w.u8(self.confirmation);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        let mut params = [0.0; 7];
        for p in params.iter_mut() {
            *p = r.f32();
        }
        Ok(Self {
            params,
            command: r.u16(),
            target_system: r.u8(),
            target_component: r.u8(),
            confirmation: r.u8(),
        })
    }
}

/// COMMAND_ACK (#77)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CommandAck {
    pub command: u16,
    pub result: MavResult,
    pub progress: u8,
    pub result_param2: i32,
    pub target_system: u8,
    pub target_component: u8,
}

impl Message for CommandAck {
    const ID: u32 = 77;
    const CRC_EXTRA: u8 = 143;
    const LEN: usize = 10;

    fn write(&self, w: &mut Writer<'_>) {
        w.u16(self.command);
        w.u8(self.result as u8);
        w.u8(self.progress);
        w.i32(self.result_param2);
        w.u8(self.target_system);
        w.u8(self.target_component);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            command: r.u16(),
            result: MavResult::try_from(r.u8())?,
            progress: r.u8(),
            result_param2: r.i32(),
            target_system: r.u8(),
            target_component: r.u8(),
        })
    }
}

/// GIMBAL_MANAGER_INFORMATION (#280)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GimbalManagerInformation {
    pub time_boot_ms: u32,
    pub cap_flags: u32,
    /// Angular limits in radians; NaN means unlimited.
    pub roll_min: f32,
    pub roll_max: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
    pub yaw_min: f32,
    pub yaw_max: f32,
    pub gimbal_device_id: u8,
}

impl Message for GimbalManagerInformation {
    const ID: u32 = 280;
    const CRC_EXTRA: u8 = 70;
    const LEN: usize = 33;

    fn write(&self, w: &mut Writer<'_>) {
        w.u32(self.time_boot_ms);
        w.u32(self.cap_flags);
        w.f32(self.roll_min);
        w.f32(self.roll_max);
        w.f32(self.pitch_min);
        w.f32(self.pitch_max);
        w.f32(self.yaw_min);
        w.f32(self.yaw_max);
        w.u8(self.gimbal_device_id);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            time_boot_ms: r.u32(),
            cap_flags: r.u32(),
            roll_min: r.f32(),
            roll_max: r.f32(),
            pitch_min: r.f32(),
            pitch_max: r.f32(),
            yaw_min: r.f32(),
            yaw_max: r.f32(),
            gimbal_device_id: r.u8(),
        })
    }
}

/// GIMBAL_MANAGER_STATUS (#281)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GimbalManagerStatus {
    pub time_boot_ms: u32,
    pub flags: u32,
    pub gimbal_device_id: u8,
    pub primary_control_sysid: u8,
    pub primary_control_compid: u8,
    pub secondary_control_sysid: u8,
    pub secondary_control_compid: u8,
}

impl Message for GimbalManagerStatus {
    const ID: u32 = 281;
    const CRC_EXTRA: u8 = 48;
    const LEN: usize = 13;

    fn write(&self, w: &mut Writer<'_>) {
        w.u32(self.time_boot_ms);
        w.u32(self.flags);
        w.u8(self.gimbal_device_id);
        w.u8(self.primary_control_sysid);
        w.u8(self.primary_control_compid);
        w.u8(self.secondary_control_sysid);
        w.u8(self.secondary_control_compid);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            time_boot_ms: r.u32(),
            flags: r.u32(),
            gimbal_device_id: r.u8(),
            primary_control_sysid: r.u8(),
            primary_control_compid: r.u8(),
            secondary_control_sysid: r.u8(),
            secondary_control_compid: r.u8(),
        })
    }
}

/// GIMBAL_MANAGER_SET_ATTITUDE (#282)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GimbalManagerSetAttitude {
    pub flags: u32,
    /// `[w, x, y, z]`
    pub q: [f32; 4],
    pub angular_velocity_x: f32,
    pub angular_velocity_y: f32,
    pub angular_velocity_z: f32,
    pub target_system: u8,
    pub target_component: u8,
    pub gimbal_device_id: u8,
}

impl Message for GimbalManagerSetAttitude {
    const ID: u32 = 282;
    const CRC_EXTRA: u8 = 123;
    const LEN: usize = 35;

    fn write(&self, w: &mut Writer<'_>) {
        w.u32(self.flags);
        for q in self.q {
            w.f32(q);
        }
        w.f32(self.angular_velocity_x);
        w.f32(self.angular_velocity_y);
        w.f32(self.angular_velocity_z);
        w.u8(self.target_system);
        w.u8(self.target_component);
        w.u8(self.gimbal_device_id);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        let flags = r.u32();
        let mut q = [0.0; 4];
        for v in q.iter_mut() {
            *v = r.f32();
        }
        Ok(Self {
            flags,
            q,
            angular_velocity_x: r.f32(),
            angular_velocity_y: r.f32(),
            angular_velocity_z: r.f32(),
            target_system: r.u8(),
            target_component: r.u8(),
            gimbal_device_id: r.u8(),
        })
    }
}

/// GIMBAL_DEVICE_ATTITUDE_STATUS (#285), base fields only.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GimbalDeviceAttitudeStatus {
    pub time_boot_ms: u32,
    /// `[w, x, y, z]`
    pub q: [f32; 4],
    pub angular_velocity_x: f32,
    pub angular_velocity_y: f32,
    pub angular_velocity_z: f32,
    pub failure_flags: u32,
    pub flags: u16,
    pub target_system: u8,
    pub target_component: u8,
}

impl Message for GimbalDeviceAttitudeStatus {
    const ID: u32 = 285;
    const CRC_EXTRA: u8 = 137;
    const LEN: usize = 40;

    fn write(&self, w: &mut Writer<'_>) {
        w.u32(self.time_boot_ms);
        for q in self.q {
            w.f32(q);
        }
        w.f32(self.angular_velocity_x);
        w.f32(self.angular_velocity_y);
        w.f32(self.angular_velocity_z);
        w.u32(self.failure_flags);
        w.u16(self.flags);
        w.u8(self.target_system);
        w.u8(self.target_component);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        let time_boot_ms = r.u32();
        let mut q = [0.0; 4];
        for v in q.iter_mut() {
            *v = r.f32();
        }
        Ok(Self {
            time_boot_ms,
            q,
            angular_velocity_x: r.f32(),
            angular_velocity_y: r.f32(),
            angular_velocity_z: r.f32(),
            failure_flags: r.u32(),
            flags: r.u16(),
            target_system: r.u8(),
            target_component: r.u8(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_long_wire_layout() {
        let cmd = CommandLong {
            params: [10.0, 1.0, 20.0, 2.0, 0.0, 0.0, 0.0],
            command: MAV_CMD_DO_GIMBAL_MANAGER_CONFIGURE,
            target_system: 220,
            target_component: MAV_COMP_ID_GIMBAL,
            confirmation: 0,
        };
        let mut buf = [0u8; 40];
        assert_eq!(cmd.encode(&mut buf), Ok(33));
        assert_eq!(&buf[0..4], &10.0f32.to_le_bytes());
        assert_eq!(&buf[28..30], &1001u16.to_le_bytes());
        assert_eq!(buf[30], 220);
        assert_eq!(buf[31], 154);
        assert_eq!(CommandLong::decode(&buf[..33]), Ok(cmd));
    }

    #[test]
    fn truncated_payload_reads_as_zero() {
        // Heartbeat with only custom_mode and type present.
        let payload = [0, 0, 0, 0, MAV_TYPE_ANTENNA_TRACKER];
        let hb = Heartbeat::decode(&payload).unwrap();
        assert_eq!(hb.mav_type, 5);
        assert_eq!(hb.autopilot, 0);
        assert_eq!(hb.mavlink_version, 0);
    }

    #[test]
    fn ack_rejects_unknown_result() {
        let mut buf = [0u8; 10];
        buf[2] = 42;
        assert_eq!(CommandAck::decode(&buf), Err(Error::InvalidEnum(42)));
    }

    #[test]
    fn encode_needs_room() {
        let mut buf = [0u8; 8];
        assert_eq!(Heartbeat::TRACKER.encode(&mut buf), Err(Error::BufferTooSmall));
    }

    #[test]
    fn lookup_knows_every_message() {
        assert_eq!(
            lookup(285),
            Some(MessageInfo {
                crc_extra: 137,
                len: 40
            })
        );
        assert_eq!(lookup(76).map(|i| i.crc_extra), Some(152));
        assert_eq!(lookup(1), None);
    }
}
