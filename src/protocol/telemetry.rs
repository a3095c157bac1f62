// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Gimbal telemetry state and the periodic triggers that publish it.

use log::info;

use super::engine::Work;
use crate::config::ProtocolConfig;
use crate::sched::{Periodic, WorkQueue};

/// Gimbal state reported to the ground station.
///
/// Owned by the protocol engine; command handlers write it and telemetry encoders read it, both on
/// the worker.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GimbalTelemetryState {
    /// `[w, x, y, z]`
    pub quaternion: [f32; 4],
    /// rad/s
    pub angular_velocity: [f32; 3],
    pub failure_flags: u32,
    pub primary_sysid: u8,
    pub primary_compid: u8,
    pub secondary_sysid: u8,
    pub secondary_compid: u8,
}

/// The three periodic telemetry triggers, started and stopped together.
///
/// Polled from the millisecond tick; a firing only submits work, encoding happens on the worker.
pub struct TelemetryTimers {
    heartbeat: Periodic,
    manager_status: Periodic,
    attitude_status: Periodic,
    link_up: bool,
}

impl TelemetryTimers {
    pub const fn new(config: &ProtocolConfig) -> Self {
        Self {
            heartbeat: Periodic::new(config.heartbeat_period_ms),
            manager_status: Periodic::new(config.manager_status_period_ms),
            attitude_status: Periodic::new(config.attitude_status_period_ms),
            link_up: false,
        }
    }

    pub fn start(&mut self, now_ms: i64) {
        self.heartbeat.start(now_ms);
        self.manager_status.start(now_ms);
        self.attitude_status.start(now_ms);
        info!("telemetry started");
    }

    pub fn stop(&mut self) {
        self.heartbeat.stop();
        self.manager_status.stop();
        self.attitude_status.stop();
        info!("telemetry stopped");
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.heartbeat.is_running()
    }

    /// Report the link state. Timers start on the rising edge and stop on the falling edge.
    pub fn set_link_up(&mut self, up: bool, now_ms: i64) {
        if up == self.link_up {
            return;
        }
        self.link_up = up;
        if up {
            info!("link up");
            self.start(now_ms);
        } else {
            info!("link down");
            self.stop();
        }
    }

    /// Submit work for every trigger that is due. Returns how many fired.
    pub fn poll<const N: usize>(&mut self, now_ms: i64, work: &WorkQueue<Work, N>) -> usize {
        let mut fired = 0;
        for (timer, item) in [
            (&mut self.heartbeat, Work::Heartbeat),
            (&mut self.manager_status, Work::GimbalManagerStatus),
            (&mut self.attitude_status, Work::GimbalDeviceAttitudeStatus),
        ] {
            if timer.poll(now_ms) {
                work.submit(item);
                fired += 1;
            }
        }
        fired
    }
}
