// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MAVLink framing: an incremental byte-at-a-time parser and a v2 frame encoder.
//!
//! The parser accepts MAVLink 1 and MAVLink 2 frames. A frame that fails any check (unknown message
//! id, oversize payload, unsupported incompat flags, bad CRC) is dropped and counted, and the
//! parser goes back to hunting for a start byte. There is no other resynchronization.

use log::{debug, warn};

use super::crc::Crc;
use super::messages::{self, Message};
use super::Error;

pub const STX_V1: u8 = 0xFE;
pub const STX_V2: u8 = 0xFD;
pub const MAX_PAYLOAD_LEN: usize = 255;
/// Incompat flag: frame carries a 13-byte signature after the CRC.
pub const INCOMPAT_SIGNED: u8 = 0x01;
pub const SIGNATURE_LEN: usize = 13;

const V2_HEADER_LEN: usize = 10;
const CHECKSUM_LEN: usize = 2;
/// Largest frame [`encode`] can produce.
pub const MAX_FRAME_LEN: usize = V2_HEADER_LEN + MAX_PAYLOAD_LEN + CHECKSUM_LEN + SIGNATURE_LEN;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Version {
    V1,
    V2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    pub len: u8,
    pub incompat_flags: u8,
    pub compat_flags: u8,
    pub seq: u8,
    pub sysid: u8,
    pub compid: u8,
    pub msgid: u32,
}

impl Header {
    const fn empty(version: Version) -> Self {
        Self {
            version,
            len: 0,
            incompat_flags: 0,
            compat_flags: 0,
            seq: 0,
            sysid: 0,
            compid: 0,
            msgid: 0,
        }
    }
}

/// A validated frame. Payload bytes past `header.len` are zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub header: Header,
    payload: [u8; MAX_PAYLOAD_LEN],
}

impl Frame {
    /// Decode the payload as `M`, zero-extending a truncated payload.
    pub fn decode<M: Message>(&self) -> Result<M, Error> {
        if self.header.msgid != M::ID {
            return Err(Error::WrongMessage(self.header.msgid));
        }
        M::decode(&self.payload)
    }
}

/// Frames dropped by the parser, by reason.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParserStats {
    pub frames: u32,
    pub crc_errors: u32,
    pub unknown_messages: u32,
    pub bad_flags: u32,
    pub bad_length: u32,
}

enum State {
    Idle,
    Len,
    IncompatFlags,
    CompatFlags,
    Seq,
    SysId,
    CompId,
    MsgId { index: u8 },
    Payload { index: usize },
    CrcLow,
    CrcHigh { low: u8 },
    Signature { remaining: usize },
}

pub struct Parser {
    state: State,
    crc: Crc,
    frame: Frame,
    stats: ParserStats,
}

impl Parser {
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            crc: Crc::new(),
            frame: Frame {
                header: Header::empty(Version::V2),
                payload: [0; MAX_PAYLOAD_LEN],
            },
            stats: ParserStats {
                frames: 0,
                crc_errors: 0,
                unknown_messages: 0,
                bad_flags: 0,
                bad_length: 0,
            },
        }
    }

    #[inline]
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// True when between frames.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    fn begin(&mut self, version: Version) {
        self.crc = Crc::new();
        self.frame.header = Header::empty(version);
        self.frame.payload = [0; MAX_PAYLOAD_LEN];
        self.state = State::Len;
    }

    fn header_byte(&mut self, byte: u8) {
        self.crc.accumulate(byte);
    }

    /// Process a single incoming byte. Returns the frame once its last byte has been seen.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            State::Idle => match byte {
                STX_V1 => self.begin(Version::V1),
                STX_V2 => self.begin(Version::V2),
                _ => {}
            },
            State::Len => {
                self.header_byte(byte);
                self.frame.header.len = byte;
                self.state = match self.frame.header.version {
                    Version::V1 => State::Seq,
                    Version::V2 => State::IncompatFlags,
                };
            }
            State::IncompatFlags => {
                self.header_byte(byte);
                self.frame.header.incompat_flags = byte;
                if byte & !INCOMPAT_SIGNED != 0 {
                    warn!("dropping frame with incompat flags {:#04x}", byte);
                    self.stats.bad_flags += 1;
                    self.state = State::Idle;
                } else {
                    self.state = State::CompatFlags;
                }
            }
            State::CompatFlags => {
                self.header_byte(byte);
                self.frame.header.compat_flags = byte;
                self.state = State::Seq;
            }
            State::Seq => {
                self.header_byte(byte);
                self.frame.header.seq = byte;
                self.state = State::SysId;
            }
            State::SysId => {
                self.header_byte(byte);
                self.frame.header.sysid = byte;
                self.state = State::CompId;
            }
            State::CompId => {
                self.header_byte(byte);
                self.frame.header.compid = byte;
                self.state = State::MsgId { index: 0 };
            }
            State::MsgId { index } => {
                self.header_byte(byte);
                self.frame.header.msgid |= (byte as u32) << (8 * index as u32);

                let id_len = match self.frame.header.version {
                    Version::V1 => 1,
                    Version::V2 => 3,
                };
                self.state = if index + 1 < id_len {
                    State::MsgId { index: index + 1 }
                } else if self.frame.header.len == 0 {
                    State::CrcLow
                } else {
                    State::Payload { index: 0 }
                };
            }
            State::Payload { index } => {
                self.crc.accumulate(byte);
                self.frame.payload[index] = byte;
                self.state = if index + 1 < self.frame.header.len as usize {
                    State::Payload { index: index + 1 }
                } else {
                    State::CrcLow
                };
            }
            State::CrcLow => {
                self.state = State::CrcHigh { low: byte };
            }
            State::CrcHigh { low } => {
                self.state = State::Idle;
                let received = u16::from_le_bytes([low, byte]);
                if self.check(received) {
                    if self.frame.header.incompat_flags & INCOMPAT_SIGNED != 0 {
                        self.state = State::Signature {
                            remaining: SIGNATURE_LEN,
                        };
                    } else {
                        return Some(self.complete());
                    }
                }
            }
            State::Signature { remaining } => {
                if remaining > 1 {
                    self.state = State::Signature {
                        remaining: remaining - 1,
                    };
                } else {
                    self.state = State::Idle;
                    return Some(self.complete());
                }
            }
        }
        None
    }

    fn check(&mut self, received: u16) -> bool {
        let header = &self.frame.header;
        let info = match messages::lookup(header.msgid) {
            Some(info) => info,
            None => {
                debug!("dropping unknown message {}", header.msgid);
                self.stats.unknown_messages += 1;
                return false;
            }
        };

        let len = header.len as usize;
        let len_ok = match header.version {
            Version::V1 => len == info.len,
            Version::V2 => len <= info.len,
        };
        if !len_ok {
            warn!(
                "dropping message {} with payload length {} (expected {})",
                header.msgid, len, info.len
            );
            self.stats.bad_length += 1;
            return false;
        }

        let mut crc = self.crc;
        crc.accumulate(info.crc_extra);
        if crc.value() != received {
            warn!(
                "crc mismatch on message {}: got {:#06x}, expected {:#06x}",
                header.msgid,
                received,
                crc.value()
            );
            self.stats.crc_errors += 1;
            return false;
        }
        true
    }

    fn complete(&mut self) -> Frame {
        self.stats.frames = self.stats.frames.wrapping_add(1);
        self.frame.clone()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize `msg` as an unsigned MAVLink 2 frame into `buf`.
///
/// Trailing zero bytes of the payload are truncated (keeping at least one). Returns the frame
/// length.
pub fn encode<M: Message>(
    msg: &M,
    seq: u8,
    sysid: u8,
    compid: u8,
    buf: &mut [u8],
) -> Result<usize, Error> {
    if M::LEN > MAX_PAYLOAD_LEN {
        return Err(Error::PayloadTooLong);
    }
    let mut payload = [0u8; MAX_PAYLOAD_LEN];
    let mut len = msg.encode(&mut payload)?;
    while len > 1 && payload[len - 1] == 0 {
        len -= 1;
    }

    let total = V2_HEADER_LEN + len + CHECKSUM_LEN;
    if buf.len() < total {
        return Err(Error::BufferTooSmall);
    }

    let id = M::ID.to_le_bytes();
    buf[..V2_HEADER_LEN].copy_from_slice(&[
        STX_V2, len as u8, 0, 0, seq, sysid, compid, id[0], id[1], id[2],
    ]);
    buf[V2_HEADER_LEN..V2_HEADER_LEN + len].copy_from_slice(&payload[..len]);

    let mut crc = Crc::new();
    crc.accumulate_slice(&buf[1..V2_HEADER_LEN + len]);
    crc.accumulate(M::CRC_EXTRA);
    buf[V2_HEADER_LEN + len..total].copy_from_slice(&crc.value().to_le_bytes());

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{CommandLong, GimbalManagerStatus, Heartbeat};
    use std::vec::Vec;

    fn parse_all(parser: &mut Parser, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&b| parser.push(b)).collect()
    }

    fn heartbeat_v2() -> Vec<u8> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = encode(&Heartbeat::TRACKER, 7, 1, 2, &mut buf).unwrap();
        buf[..n].to_vec()
    }

    /// MAVLink 1 heartbeat built by hand.
    fn heartbeat_v1() -> Vec<u8> {
        let mut payload = [0u8; 9];
        Heartbeat::TRACKER.encode(&mut payload).unwrap();
        let mut frame = std::vec![STX_V1, 9, 3, 42, 1, 0];
        frame.extend_from_slice(&payload);
        let mut crc = Crc::new();
        crc.accumulate_slice(&frame[1..]);
        crc.accumulate(50);
        frame.extend_from_slice(&crc.value().to_le_bytes());
        frame
    }

    #[test]
    fn encodes_v2_header() {
        let bytes = heartbeat_v2();
        // custom_mode is zero but the tail is not, so nothing is truncated.
        assert_eq!(&bytes[..10], &[STX_V2, 9, 0, 0, 7, 1, 2, 0, 0, 0]);
        assert_eq!(bytes.len(), 10 + 9 + 2);
    }

    #[test]
    fn trailing_zeros_are_truncated() {
        let status = GimbalManagerStatus {
            time_boot_ms: 0,
            flags: 24,
            gimbal_device_id: 0,
            primary_control_sysid: 0,
            primary_control_compid: 0,
            secondary_control_sysid: 0,
            secondary_control_compid: 0,
        };
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = encode(&status, 0, 220, 154, &mut buf).unwrap();
        assert_eq!(buf[1], 5);
        assert_eq!(n, 10 + 5 + 2);

        let frame = Parser::new().push_all(&buf[..n]).unwrap();
        assert_eq!(frame.decode::<GimbalManagerStatus>(), Ok(status));
    }

    #[test]
    fn all_zero_payload_keeps_one_byte() {
        let cmd = CommandLong {
            params: [0.0; 7],
            command: 0,
            target_system: 0,
            target_component: 0,
            confirmation: 0,
        };
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = encode(&cmd, 0, 1, 1, &mut buf).unwrap();
        assert_eq!(buf[1], 1);
        assert_eq!(n, 13);
    }

    #[test]
    fn parses_v2_round_trip() {
        let mut parser = Parser::new();
        let frames = parse_all(&mut parser, &heartbeat_v2());
        assert_eq!(frames.len(), 1);
        let f = &frames[0];
        assert_eq!(f.header.version, Version::V2);
        assert_eq!((f.header.seq, f.header.sysid, f.header.compid), (7, 1, 2));
        assert_eq!(f.decode::<Heartbeat>(), Ok(Heartbeat::TRACKER));
        assert_eq!(parser.stats().frames, 1);
    }

    #[test]
    fn parses_v1() {
        let mut parser = Parser::new();
        let frames = parse_all(&mut parser, &heartbeat_v1());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].header.version, Version::V1);
        assert_eq!(frames[0].header.sysid, 42);
        assert_eq!(frames[0].decode::<Heartbeat>(), Ok(Heartbeat::TRACKER));
    }

    #[test]
    fn frame_split_across_calls() {
        let bytes = heartbeat_v2();
        let mut parser = Parser::new();
        assert!(parse_all(&mut parser, &bytes[..6]).is_empty());
        assert!(!parser.is_idle());
        assert_eq!(parse_all(&mut parser, &bytes[6..]).len(), 1);
    }

    #[test]
    fn garbage_before_frame_is_skipped() {
        let mut bytes = std::vec![0x00, 0x55, 0x13, 0x37];
        bytes.extend(heartbeat_v2());
        assert_eq!(parse_all(&mut Parser::new(), &bytes).len(), 1);
    }

    #[test]
    fn bad_crc_is_dropped_and_parser_recovers() {
        let mut bad = heartbeat_v2();
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        bad.extend(heartbeat_v2());

        let mut parser = Parser::new();
        assert_eq!(parse_all(&mut parser, &bad).len(), 1);
        assert_eq!(parser.stats().crc_errors, 1);
    }

    #[test]
    fn unknown_message_is_counted() {
        let mut bytes = heartbeat_v2();
        bytes[7] = 0x99;
        let mut parser = Parser::new();
        assert!(parse_all(&mut parser, &bytes).is_empty());
        assert_eq!(parser.stats().unknown_messages, 1);
    }

    #[test]
    fn unsupported_incompat_flags_are_rejected() {
        let mut bytes = heartbeat_v2();
        bytes[2] = 0x02;
        let mut parser = Parser::new();
        assert!(parse_all(&mut parser, &bytes).is_empty());
        assert_eq!(parser.stats().bad_flags, 1);
    }

    #[test]
    fn signed_frame_skips_signature() {
        let mut bytes = heartbeat_v2();
        bytes[2] = INCOMPAT_SIGNED;
        // Recompute the CRC over the modified header.
        let body_end = bytes.len() - 2;
        let mut crc = Crc::new();
        crc.accumulate_slice(&bytes[1..body_end]);
        crc.accumulate(50);
        bytes.truncate(body_end);
        bytes.extend_from_slice(&crc.value().to_le_bytes());
        bytes.extend_from_slice(&[0xAB; SIGNATURE_LEN]);

        let mut parser = Parser::new();
        assert!(parse_all(&mut parser, &bytes[..bytes.len() - 1]).is_empty());
        let frame = parser.push(bytes[bytes.len() - 1]).unwrap();
        assert_eq!(frame.header.incompat_flags, INCOMPAT_SIGNED);
        assert!(parser.is_idle());
    }

    #[test]
    fn oversize_v2_payload_is_dropped() {
        let mut parser = Parser::new();
        let mut bytes = std::vec![STX_V2, 10, 0, 0, 0, 1, 1, 0, 0, 0];
        bytes.extend_from_slice(&[1; 10]);
        let mut crc = Crc::new();
        crc.accumulate_slice(&bytes[1..]);
        crc.accumulate(50);
        bytes.extend_from_slice(&crc.value().to_le_bytes());

        assert!(parse_all(&mut parser, &bytes).is_empty());
        assert_eq!(parser.stats().bad_length, 1);
    }

    #[test]
    fn decode_checks_message_id() {
        let frame = Parser::new().push_all(&heartbeat_v2()).unwrap();
        assert_eq!(
            frame.decode::<CommandLong>(),
            Err(Error::WrongMessage(0))
        );
    }

    impl Parser {
        fn push_all(&mut self, bytes: &[u8]) -> Option<Frame> {
            bytes.iter().filter_map(|&b| self.push(b)).last()
        }
    }
}
