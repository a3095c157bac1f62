// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Motor actuation stage.
//!
//! Consumes [`MotorSetpoint`]s from the motor queue and writes each one to the PWM channel wired to
//! that motor.

use log::error;

use super::{Motor, MotorSetpoint, PwmChannel, PwmOutput};
use crate::sched::BoundedQueue;

pub struct Actuator<P> {
    output: P,
    altitude: PwmChannel,
    azimuth: PwmChannel,
}

impl<P: PwmOutput> Actuator<P> {
    pub fn new(output: P, altitude: PwmChannel, azimuth: PwmChannel) -> Self {
        Self {
            output,
            altitude,
            azimuth,
        }
    }

    /// The channel driving `motor`.
    #[inline]
    pub fn channel(&self, motor: Motor) -> PwmChannel {
        match motor {
            Motor::Altitude => self.altitude,
            Motor::Azimuth => self.azimuth,
        }
    }

    /// Access the underlying PWM output.
    #[inline]
    pub fn output(&self) -> &P {
        &self.output
    }

    /// Write one setpoint to hardware.
    pub fn apply(&mut self, setpoint: MotorSetpoint) -> Result<(), P::Error> {
        let ch = self.channel(setpoint.motor);
        self.output
            .set_pulse(ch.channel, ch.period_us, setpoint.pwm_us, ch.flags)
    }

    /// Apply the next queued setpoint.
    ///
    /// `WouldBlock` if the queue is empty; a failed write is logged and returned as `Other`.
    pub fn step<const N: usize>(
        &mut self,
        queue: &BoundedQueue<MotorSetpoint, N>,
    ) -> nb::Result<MotorSetpoint, P::Error> {
        let setpoint = match queue.try_receive() {
            Ok(sp) => sp,
            Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(never)) => match never {},
        };

        if let Err(e) = self.apply(setpoint) {
            error!("{:?}: pwm write failed: {:?}", setpoint.motor, e);
            return Err(nb::Error::Other(e));
        }
        Ok(setpoint)
    }
}
