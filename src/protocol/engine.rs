// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Protocol worker: parses inbound frames, dispatches commands and encodes outbound telemetry.
//!
//! Everything here runs on the worker context, driven by [`Work`] items that interrupt handlers
//! and timers submit. Nothing in this module is called from an interrupt.

use core::f32::consts::FRAC_PI_2;

use log::{debug, info, warn};

use super::frame::{self, Frame, Parser, ParserStats, MAX_FRAME_LEN};
use super::messages::*;
use super::telemetry::GimbalTelemetryState;
use crate::config::ProtocolConfig;
use crate::math::quat_to_euler;
use crate::sched::{Deferred, WorkQueue};
use crate::transport::{SerialLink, FIFO_CHUNK};

/// A deferred protocol job.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Work {
    /// Bytes are waiting in the receive ring.
    ParseInbound,
    Heartbeat,
    GimbalManagerStatus,
    GimbalDeviceAttitudeStatus,
    GimbalManagerInformation,
    CommandAck(AckData),
}

impl Deferred for Work {
    fn coalesces(&self) -> bool {
        !matches!(self, Work::CommandAck(_))
    }
}

/// What an acknowledgment carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AckData {
    pub command: u16,
    pub result: MavResult,
    pub target_system: u8,
    pub target_component: u8,
}

/// Outcome of handling one inbound frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// A command was handled and an acknowledgment scheduled.
    Acknowledged(AckData),
    /// Gimbal-manager information was requested and scheduled.
    InformationRequested,
    /// A set-attitude request was decoded. It is reported but does not reach the controller.
    SetAttitude {
        quaternion: [f32; 4],
        /// `[pitch, roll, yaw]` in degrees.
        euler: [f32; 3],
    },
    /// Nothing to do for this frame.
    Ignored,
}

/// Our address on the link.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub system_id: u8,
    pub component_id: u8,
}

impl From<&ProtocolConfig> for Identity {
    fn from(config: &ProtocolConfig) -> Self {
        Self {
            system_id: config.system_id,
            component_id: config.component_id,
        }
    }
}

/// The protocol worker.
///
/// `K` is called whenever bytes are queued for transmission, so the transport can (re-)enable its
/// transmit-ready interrupt.
pub struct ProtocolEngine<'a, const W: usize, K> {
    identity: Identity,
    link: &'a SerialLink,
    work: &'a WorkQueue<Work, W>,
    kick: K,

    parser: Parser,
    telemetry: GimbalTelemetryState,
    seq: u8,
    send_buffer: [u8; MAX_FRAME_LEN],
}

impl<'a, const W: usize, K: FnMut()> ProtocolEngine<'a, W, K> {
    pub fn new(
        config: &ProtocolConfig,
        link: &'a SerialLink,
        work: &'a WorkQueue<Work, W>,
        kick: K,
    ) -> Self {
        Self {
            identity: Identity::from(config),
            link,
            work,
            kick,
            parser: Parser::new(),
            telemetry: GimbalTelemetryState::default(),
            seq: 0,
            send_buffer: [0; MAX_FRAME_LEN],
        }
    }

    #[inline]
    pub fn telemetry(&self) -> &GimbalTelemetryState {
        &self.telemetry
    }

    #[inline]
    pub fn telemetry_mut(&mut self) -> &mut GimbalTelemetryState {
        &mut self.telemetry
    }

    #[inline]
    pub fn parser_stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Run every pending work item. Returns how many ran.
    pub fn drain_work(&mut self, now_ms: i64) -> usize {
        let mut ran = 0;
        while let Some(item) = self.work.take() {
            self.run(item, now_ms);
            ran += 1;
        }
        ran
    }

    /// Run one work item.
    pub fn run(&mut self, item: Work, now_ms: i64) {
        let time_boot_ms = now_ms as u32;
        match item {
            Work::ParseInbound => {
                self.parse_inbound();
            }
            Work::Heartbeat => self.send(&Heartbeat::TRACKER),
            Work::GimbalManagerStatus => {
                let msg = self.manager_status(time_boot_ms);
                self.send(&msg);
            }
            Work::GimbalDeviceAttitudeStatus => {
                let msg = self.device_attitude_status(time_boot_ms);
                self.send(&msg);
            }
            Work::GimbalManagerInformation => {
                let msg = self.manager_information(time_boot_ms);
                self.send(&msg);
            }
            Work::CommandAck(ack) => {
                let msg = CommandAck {
                    command: ack.command,
                    result: ack.result,
                    progress: 0,
                    result_param2: 0,
                    target_system: ack.target_system,
                    target_component: ack.target_component,
                };
                self.send(&msg);
            }
        }
    }

    /// Feed everything in the receive ring through the parser and dispatch each complete frame.
    ///
    /// Returns the outcomes in order. A partial frame at the end stays in the parser.
    pub fn parse_inbound(&mut self) -> heapless::Vec<Dispatch, 8> {
        let mut outcomes = heapless::Vec::new();
        let mut chunk = [0u8; FIFO_CHUNK];
        loop {
            let n = self.link.read_inbound(&mut chunk);
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                if let Some(frame) = self.parser.push(byte) {
                    let outcome = self.handle_frame(&frame);
                    if outcomes.push(outcome).is_err() {
                        debug!("dispatch log full");
                    }
                }
            }
        }
        outcomes
    }

    /// Act on one decoded frame.
    pub fn handle_frame(&mut self, frame: &Frame) -> Dispatch {
        let header = frame.header;
        match header.msgid {
            CommandLong::ID => match frame.decode::<CommandLong>() {
                Ok(cmd) => self.handle_command(&cmd, header.sysid, header.compid),
                Err(e) => {
                    warn!("bad COMMAND_LONG: {:?}", e);
                    Dispatch::Ignored
                }
            },
            GimbalManagerSetAttitude::ID => match frame.decode::<GimbalManagerSetAttitude>() {
                Ok(set) => {
                    let euler = quat_to_euler(set.q);
                    info!(
                        "set_attitude quat ({}, {}, {}, {}) euler ({} {} {})",
                        set.q[0], set.q[1], set.q[2], set.q[3], euler[0], euler[1], euler[2]
                    );
                    Dispatch::SetAttitude {
                        quaternion: set.q,
                        euler,
                    }
                }
                Err(e) => {
                    warn!("bad GIMBAL_MANAGER_SET_ATTITUDE: {:?}", e);
                    Dispatch::Ignored
                }
            },
            other => {
                debug!("ignoring message {} from {}/{}", other, header.sysid, header.compid);
                Dispatch::Ignored
            }
        }
    }

    fn handle_command(&mut self, cmd: &CommandLong, sysid: u8, compid: u8) -> Dispatch {
        let result = match cmd.command {
            MAV_CMD_REQUEST_MESSAGE => {
                // No acknowledgment for requests.
                return if cmd.params[0] == GimbalManagerInformation::ID as f32 {
                    self.work.submit(Work::GimbalManagerInformation);
                    Dispatch::InformationRequested
                } else {
                    debug!("not providing message {}", cmd.params[0]);
                    Dispatch::Ignored
                };
            }
            MAV_CMD_DO_GIMBAL_MANAGER_CONFIGURE => {
                self.telemetry.primary_sysid = cmd.params[0] as u8;
                self.telemetry.primary_compid = cmd.params[1] as u8;
                self.telemetry.secondary_sysid = cmd.params[2] as u8;
                self.telemetry.secondary_compid = cmd.params[3] as u8;
                info!(
                    "gimbal control: primary {}/{}, secondary {}/{}",
                    self.telemetry.primary_sysid,
                    self.telemetry.primary_compid,
                    self.telemetry.secondary_sysid,
                    self.telemetry.secondary_compid
                );
                MavResult::Accepted
            }
            other => {
                debug!("unsupported command {}", other);
                MavResult::Unsupported
            }
        };

        let ack = AckData {
            command: cmd.command,
            result,
            target_system: sysid,
            target_component: compid,
        };
        self.work.submit(Work::CommandAck(ack));
        Dispatch::Acknowledged(ack)
    }

    fn manager_status(&self, time_boot_ms: u32) -> GimbalManagerStatus {
        GimbalManagerStatus {
            time_boot_ms,
            flags: GIMBAL_FLAGS_YAW_LOCK | GIMBAL_FLAGS_PITCH_LOCK,
            gimbal_device_id: 0,
            primary_control_sysid: 0,
            primary_control_compid: 0,
            secondary_control_sysid: 0,
            secondary_control_compid: 0,
        }
    }

    fn device_attitude_status(&self, time_boot_ms: u32) -> GimbalDeviceAttitudeStatus {
        let t = &self.telemetry;
        GimbalDeviceAttitudeStatus {
            time_boot_ms,
            q: t.quaternion,
            angular_velocity_x: t.angular_velocity[0],
            angular_velocity_y: t.angular_velocity[1],
            angular_velocity_z: t.angular_velocity[2],
            failure_flags: t.failure_flags,
            flags: (GIMBAL_FLAGS_YAW_LOCK | GIMBAL_FLAGS_PITCH_LOCK) as u16,
            target_system: 0,
            target_component: 0,
        }
    }

    fn manager_information(&self, time_boot_ms: u32) -> GimbalManagerInformation {
        GimbalManagerInformation {
            time_boot_ms,
            cap_flags: GIMBAL_MANAGER_CAP_FLAGS_HAS_PITCH_AXIS
                | GIMBAL_MANAGER_CAP_FLAGS_HAS_YAW_AXIS
                | GIMBAL_MANAGER_CAP_FLAGS_HAS_PITCH_LOCK
                | GIMBAL_MANAGER_CAP_FLAGS_HAS_YAW_LOCK
                | GIMBAL_MANAGER_CAP_FLAGS_SUPPORTS_INFINITE_YAW,
            roll_min: 0.0,
            roll_max: 0.0,
            pitch_min: -FRAC_PI_2,
            pitch_max: FRAC_PI_2,
            yaw_min: f32::NAN,
            yaw_max: f32::NAN,
            gimbal_device_id: self.identity.component_id,
        }
    }

    /// Encode `msg` into the send buffer and queue as much of it as fits.
    fn send<M: Message>(&mut self, msg: &M) {
        let len = match frame::encode(
            msg,
            self.seq,
            self.identity.system_id,
            self.identity.component_id,
            &mut self.send_buffer,
        ) {
            Ok(len) => len,
            Err(e) => {
                warn!("failed to encode message {}: {:?}", M::ID, e);
                return;
            }
        };
        self.seq = self.seq.wrapping_add(1);

        self.link.queue_outbound(&self.send_buffer[..len]);
        (self.kick)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::capacity;
    use std::vec::Vec;

    type Queue = WorkQueue<Work, { capacity::WORK }>;

    fn frame_from<M: Message>(msg: &M, sysid: u8, compid: u8) -> Frame {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = frame::encode(msg, 0, sysid, compid, &mut buf).unwrap();
        let mut parser = Parser::new();
        buf[..n].iter().filter_map(|&b| parser.push(b)).last().unwrap()
    }

    fn command(command: u16, params: [f32; 7]) -> CommandLong {
        CommandLong {
            params,
            command,
            target_system: 220,
            target_component: MAV_COMP_ID_GIMBAL,
            confirmation: 0,
        }
    }

    fn sent_frames(link: &SerialLink) -> Vec<Frame> {
        let mut parser = Parser::new();
        let mut out = Vec::new();
        let mut chunk = [0u8; FIFO_CHUNK];
        loop {
            let n = link.on_tx_ready(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend(chunk[..n].iter().filter_map(|&b| parser.push(b)));
        }
        out
    }

    #[test]
    fn configure_stores_controllers_and_acks() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut engine = ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || {});

        let cmd = command(
            MAV_CMD_DO_GIMBAL_MANAGER_CONFIGURE,
            [10.0, 1.0, 20.0, 2.0, 0.0, 0.0, 0.0],
        );
        let outcome = engine.handle_frame(&frame_from(&cmd, 255, 190));

        let t = engine.telemetry();
        assert_eq!((t.primary_sysid, t.primary_compid), (10, 1));
        assert_eq!((t.secondary_sysid, t.secondary_compid), (20, 2));

        let ack = AckData {
            command: MAV_CMD_DO_GIMBAL_MANAGER_CONFIGURE,
            result: MavResult::Accepted,
            target_system: 255,
            target_component: 190,
        };
        assert_eq!(outcome, Dispatch::Acknowledged(ack));
        assert_eq!(work.take(), Some(Work::CommandAck(ack)));
        // Nothing is transmitted until the worker runs the ack.
        assert_eq!(link.outbound_pending(), 0);
    }

    #[test]
    fn unknown_command_is_unsupported() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut engine = ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || {});

        let outcome = engine.handle_frame(&frame_from(&command(9999, [0.0; 7]), 1, 1));
        match outcome {
            Dispatch::Acknowledged(ack) => assert_eq!(ack.result, MavResult::Unsupported),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn information_request_schedules_reply_without_ack() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut engine = ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || {});

        let req = command(MAV_CMD_REQUEST_MESSAGE, [280.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            engine.handle_frame(&frame_from(&req, 1, 1)),
            Dispatch::InformationRequested
        );
        assert_eq!(work.take(), Some(Work::GimbalManagerInformation));
        assert_eq!(work.take(), None);

        let other = command(MAV_CMD_REQUEST_MESSAGE, [0.0; 7]);
        assert_eq!(engine.handle_frame(&frame_from(&other, 1, 1)), Dispatch::Ignored);
        assert_eq!(work.pending(), 0);
    }

    #[test]
    fn set_attitude_is_reported_not_forwarded() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut engine = ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || {});

        let set = GimbalManagerSetAttitude {
            flags: 0,
            q: [1.0, 0.0, 0.0, 0.0],
            angular_velocity_x: 0.0,
            angular_velocity_y: 0.0,
            angular_velocity_z: 0.0,
            target_system: 220,
            target_component: 154,
            gimbal_device_id: 0,
        };
        let outcome = engine.handle_frame(&frame_from(&set, 1, 1));
        assert_eq!(
            outcome,
            Dispatch::SetAttitude {
                quaternion: [1.0, 0.0, 0.0, 0.0],
                euler: [0.0, 0.0, 0.0],
            }
        );
        assert_eq!(work.pending(), 0);
    }

    #[test]
    fn heartbeat_is_encoded_with_identity_and_sequence() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut kicks = 0;
        let mut engine =
            ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || kicks += 1);

        engine.run(Work::Heartbeat, 0);
        engine.run(Work::Heartbeat, 1000);
        drop(engine);
        assert_eq!(kicks, 2);

        let frames = sent_frames(&link);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].header.sysid, 220);
        assert_eq!(frames[0].header.compid, 154);
        assert_eq!(frames[1].header.seq, frames[0].header.seq.wrapping_add(1));
        assert_eq!(frames[0].decode::<Heartbeat>(), Ok(Heartbeat::TRACKER));
    }

    #[test]
    fn status_messages_carry_lock_flags() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut engine = ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || {});
        engine.telemetry_mut().failure_flags = 3;
        engine.telemetry_mut().quaternion = [1.0, 0.0, 0.0, 0.0];

        engine.run(Work::GimbalManagerStatus, 1234);
        engine.run(Work::GimbalDeviceAttitudeStatus, 1300);
        engine.run(Work::GimbalManagerInformation, 1400);

        let frames = sent_frames(&link);
        let status: GimbalManagerStatus = frames[0].decode().unwrap();
        assert_eq!(status.time_boot_ms, 1234);
        assert_eq!(status.flags, 24);
        assert_eq!(status.gimbal_device_id, 0);
        assert_eq!(status.primary_control_sysid, 0);

        let att: GimbalDeviceAttitudeStatus = frames[1].decode().unwrap();
        assert_eq!(att.flags, 24);
        assert_eq!(att.failure_flags, 3);
        assert_eq!(att.q, [1.0, 0.0, 0.0, 0.0]);

        let info: GimbalManagerInformation = frames[2].decode().unwrap();
        assert_eq!(info.gimbal_device_id, 154);
        assert_eq!(info.cap_flags, 32 | 128 | 256 | 1024 | 2048);
        assert_eq!(info.pitch_max, FRAC_PI_2);
        assert!(info.yaw_min.is_nan() && info.yaw_max.is_nan());
    }

    #[test]
    fn sequence_number_wraps_after_255() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut engine = ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || {});

        let mut seqs = Vec::new();
        for now in 0..257 {
            engine.run(Work::Heartbeat, now);
            seqs.extend(sent_frames(&link).iter().map(|f| f.header.seq));
        }

        assert_eq!(seqs.len(), 257);
        assert_eq!(seqs[0], 0);
        assert_eq!(seqs[255], 255);
        assert_eq!(seqs[256], 0);
    }

    #[test]
    fn transmit_overflow_drops_the_tail() {
        let link = SerialLink::new();
        let work = Queue::new();
        let mut engine = ProtocolEngine::new(&ProtocolConfig::default(), &link, &work, || {});

        link.queue_outbound(&[0u8; capacity::RING - 5]);
        engine.run(Work::Heartbeat, 0);
        assert_eq!(link.outbound_space(), 0);
        assert_eq!(link.outbound_pending(), capacity::RING);
    }

    #[test]
    fn work_items_coalesce_except_acks() {
        let work = Queue::new();
        work.submit(Work::Heartbeat);
        work.submit(Work::Heartbeat);
        let ack = AckData {
            command: 1,
            result: MavResult::Accepted,
            target_system: 1,
            target_component: 1,
        };
        work.submit(Work::CommandAck(ack));
        work.submit(Work::CommandAck(ack));
        assert_eq!(work.pending(), 3);
    }
}
