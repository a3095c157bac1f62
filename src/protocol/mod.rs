// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Ground Station Protocol
//!
//! MAVLink link to the ground station, acting as a gimbal manager.
//!
//! ## Modules
//!
//! - [`crc`] - CRC-16/MCRF4XX used by every frame.
//! - [`messages`] - Payload types and MAVLink constants.
//! - [`frame`] - Incremental parser and frame encoder.
//! - [`telemetry`] - Reported gimbal state and the periodic telemetry triggers.
//! - [`engine`] - Worker that dispatches inbound frames and encodes outbound ones.

pub mod crc;
pub mod engine;
pub mod frame;
pub mod messages;
pub mod telemetry;

pub use engine::{AckData, Dispatch, Identity, ProtocolEngine, Work};
pub use frame::{Frame, Parser, ParserStats};
pub use messages::{MavResult, Message};
pub use telemetry::{GimbalTelemetryState, TelemetryTimers};

/// Encode/decode failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Destination buffer cannot hold the encoded message.
    BufferTooSmall,
    /// Message payload exceeds the 255-byte frame limit.
    PayloadTooLong,
    /// Frame holds a different message than the one requested.
    WrongMessage(u32),
    /// Enumerated field holds a value outside the enum.
    InvalidEnum(u32),
}
