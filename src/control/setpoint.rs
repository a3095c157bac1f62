// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Commanded targets for the attitude controller.

use crate::config::SweepConfig;
use crate::math::quat_to_euler;
use crate::sched::Periodic;

/// A commanded attitude, in whichever form the source produced it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CommandSetpoint {
    /// `[pitch, roll, yaw]` in degrees.
    Euler([f32; 3]),
    /// `[w, x, y, z]`.
    Quaternion([f32; 4]),
}

impl CommandSetpoint {
    /// `[pitch, roll, yaw]` in degrees.
    pub fn to_euler(&self) -> [f32; 3] {
        match *self {
            CommandSetpoint::Euler(e) => e,
            CommandSetpoint::Quaternion(q) => quat_to_euler(q),
        }
    }
}

impl Default for CommandSetpoint {
    fn default() -> Self {
        CommandSetpoint::Euler([0.0; 3])
    }
}

/// Local altitude sweep used when nothing else commands the tracker.
///
/// Every period the pitch target steps up by `step_deg`; once it would pass `max_deg` it falls
/// back to zero.
pub struct SweepSetpoint {
    config: SweepConfig,
    timer: Periodic,
    pitch: f32,
}

impl SweepSetpoint {
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            timer: Periodic::new(config.period_ms),
            pitch: 0.0,
        }
    }

    /// Step immediately and then once per period from `now_ms`.
    pub fn start(&mut self, now_ms: i64) -> CommandSetpoint {
        self.timer.start(now_ms);
        self.advance()
    }

    /// Returns the next setpoint when the period has elapsed.
    pub fn poll(&mut self, now_ms: i64) -> Option<CommandSetpoint> {
        if self.timer.poll(now_ms) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn advance(&mut self) -> CommandSetpoint {
        self.pitch += self.config.step_deg;
        if self.pitch > self.config.max_deg {
            self.pitch = 0.0;
        }
        CommandSetpoint::Euler([self.pitch, 0.0, 0.0])
    }
}
