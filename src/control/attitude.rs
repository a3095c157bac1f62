// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-axis attitude controller.
//!
//! One PID loop per axis. Altitude tracks the commanded pitch against the estimated pitch; azimuth
//! holds heading at 0°, independent of any commanded yaw. Each normalized loop output is mapped to
//! a servo pulse width through [`PwmLimits`].

use core::convert::Infallible;

use log::{debug, trace};

use super::pid::PidState;
use super::setpoint::CommandSetpoint;
use crate::config::TrackerConfig;
use crate::estimator::{AttitudeFrame, HEADING, PITCH};
use crate::motors::{Motor, MotorSetpoint, PwmLimits};
use crate::sched::BoundedQueue;

pub struct AttitudeController {
    altitude: PidState,
    azimuth: PidState,
    limits: PwmLimits,
    target: CommandSetpoint,
    primed: bool,
}

impl AttitudeController {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            altitude: PidState::new(config.altitude_gains),
            azimuth: PidState::new(config.azimuth_gains),
            limits: config.pwm_limits,
            target: CommandSetpoint::default(),
            primed: false,
        }
    }

    /// Currently held target.
    #[inline]
    pub fn target(&self) -> CommandSetpoint {
        self.target
    }

    /// Run both loops on one attitude frame.
    ///
    /// A new `command` replaces the held target; `None` keeps the previous one. The very first
    /// frame only establishes the time base and yields no setpoints.
    pub fn update(
        &mut self,
        frame: &AttitudeFrame,
        command: Option<CommandSetpoint>,
    ) -> Option<[MotorSetpoint; 2]> {
        if let Some(cmd) = command {
            debug!("new target {:?}", cmd);
            self.target = cmd;
        }

        if !self.primed {
            self.altitude.prime(frame.timestamp);
            self.azimuth.prime(frame.timestamp);
            self.primed = true;
            return None;
        }

        let target_alt = self.target.to_euler()[PITCH];
        let target_azm = 0.0;

        trace!(
            "angle: {:.1} {:.1} {:.1}",
            frame.angle[0],
            frame.angle[1],
            frame.angle[2]
        );

        let alt = self
            .altitude
            .process(frame.angle[PITCH], target_alt, frame.timestamp);
        let azm = self
            .azimuth
            .process(frame.angle[HEADING], target_azm, frame.timestamp);

        Some([
            MotorSetpoint {
                motor: Motor::Altitude,
                pwm_us: self.limits.pulse_width_us(alt),
            },
            MotorSetpoint {
                motor: Motor::Azimuth,
                pwm_us: self.limits.pulse_width_us(azm),
            },
        ])
    }

    /// Run one pipeline iteration.
    ///
    /// `WouldBlock` until an attitude frame is queued. Picks up a pending command without waiting
    /// and pushes both motor setpoints with clear-then-insert.
    pub fn step<const A: usize, const C: usize, const M: usize>(
        &mut self,
        attitude: &BoundedQueue<AttitudeFrame, A>,
        commands: &BoundedQueue<CommandSetpoint, C>,
        motors: &BoundedQueue<MotorSetpoint, M>,
    ) -> nb::Result<Option<[MotorSetpoint; 2]>, Infallible> {
        let frame = attitude.try_receive()?;
        let command = commands.try_receive().ok();

        let out = self.update(&frame, command);
        if let Some(setpoints) = out {
            for sp in setpoints {
                motors.send_latest(sp);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PidGains;

    fn frame(timestamp: i64, pitch: f32, heading: f32) -> AttitudeFrame {
        AttitudeFrame {
            timestamp,
            angle: [pitch, 0.0, heading],
        }
    }

    fn p_only() -> TrackerConfig {
        let g = PidGains::new(0.025, 0.0, 0.0);
        TrackerConfig::default().with_gains(g, g)
    }

    #[test]
    fn first_frame_only_primes() {
        let mut ctl = AttitudeController::new(&p_only());
        assert!(ctl.update(&frame(0, 30.0, 0.0), None).is_none());
        assert!(ctl.update(&frame(10, 30.0, 0.0), None).is_some());
    }

    #[test]
    fn pitch_error_drives_altitude() {
        let mut ctl = AttitudeController::new(&p_only());
        ctl.update(&frame(0, 0.0, 0.0), None);

        let [alt, azm] = ctl.update(&frame(10, 30.0, 0.0), None).unwrap();
        assert_eq!(alt.motor, Motor::Altitude);
        // -30 * 0.025 = -0.75 -> lower half of the range
        assert_eq!(alt.pwm_us, 1125);
        assert_eq!(azm.pwm_us, 1500);
    }

    #[test]
    fn azimuth_holds_zero_regardless_of_command() {
        let mut ctl = AttitudeController::new(&p_only());
        ctl.update(&frame(0, 0.0, 0.0), None);

        let cmd = CommandSetpoint::Euler([0.0, 0.0, 90.0]);
        let [_, azm] = ctl.update(&frame(10, 0.0, -20.0), Some(cmd)).unwrap();
        // error +20 -> 0.5 -> upper half
        assert_eq!(azm.pwm_us, 1750);
    }

    #[test]
    fn target_is_kept_without_new_command() {
        let mut ctl = AttitudeController::new(&p_only());
        ctl.update(&frame(0, 0.0, 0.0), Some(CommandSetpoint::Euler([20.0, 0.0, 0.0])));

        let [alt, _] = ctl.update(&frame(10, 0.0, 0.0), None).unwrap();
        assert_eq!(alt.pwm_us, 1750);
        assert_eq!(ctl.target(), CommandSetpoint::Euler([20.0, 0.0, 0.0]));
    }

    #[test]
    fn step_pushes_both_motors() {
        let att: BoundedQueue<AttitudeFrame, 4> = BoundedQueue::new("attitude");
        let cmd: BoundedQueue<CommandSetpoint, 2> = BoundedQueue::new("command");
        let mot: BoundedQueue<MotorSetpoint, 4> = BoundedQueue::new("motor");
        let mut ctl = AttitudeController::new(&p_only());

        assert_eq!(ctl.step(&att, &cmd, &mot), Err(nb::Error::WouldBlock));

        att.send_latest(frame(0, 0.0, 0.0));
        att.send_latest(frame(10, 0.0, 0.0));
        assert_eq!(ctl.step(&att, &cmd, &mot), Ok(None));
        assert!(ctl.step(&att, &cmd, &mot).unwrap().is_some());

        assert_eq!(mot.len(), 2);
        assert_eq!(mot.receive().motor, Motor::Altitude);
        assert_eq!(mot.receive().motor, Motor::Azimuth);
    }
}
