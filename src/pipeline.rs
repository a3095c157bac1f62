// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Queues connecting the real-time stages.
//!
//! ```text
//! imu ──┐
//!       ├─> Estimator ─> attitude ─> AttitudeController ─> motor ─> Actuator
//! mag ──┘                                  ^
//!                           command ───────┘
//! ```

use crate::config::capacity;
use crate::control::CommandSetpoint;
use crate::estimator::AttitudeFrame;
use crate::motors::MotorSetpoint;
use crate::sched::BoundedQueue;
use crate::sensors::{ImuSample, MagSample};

pub struct Channels {
    pub imu: BoundedQueue<ImuSample, { capacity::IMU }>,
    pub mag: BoundedQueue<MagSample, { capacity::MAG }>,
    pub attitude: BoundedQueue<AttitudeFrame, { capacity::ATTITUDE }>,
    pub command: BoundedQueue<CommandSetpoint, { capacity::COMMAND }>,
    pub motor: BoundedQueue<MotorSetpoint, { capacity::MOTOR }>,
}

impl Channels {
    pub const fn new() -> Self {
        Self {
            imu: BoundedQueue::new("imu"),
            mag: BoundedQueue::new("mag"),
            attitude: BoundedQueue::new("attitude"),
            command: BoundedQueue::new("command"),
            motor: BoundedQueue::new("motor"),
        }
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities() {
        let ch = Channels::new();
        assert_eq!(ch.imu.capacity(), 4);
        assert_eq!(ch.mag.capacity(), 4);
        assert_eq!(ch.attitude.capacity(), 4);
        assert_eq!(ch.command.capacity(), 2);
        assert_eq!(ch.motor.capacity(), 4);
    }
}
