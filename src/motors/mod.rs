// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains the motor-level side of the pipeline: the setpoints the attitude
//! controller emits and the stage that turns them into servo pulses.
//!
//! ## Modules
//!
//! - [`pwm`] - Pulse-width limits, channel description and the [`PwmOutput`] capability.
//! - [`actuator`] - Pipeline stage routing [`MotorSetpoint`]s to PWM channels.

pub mod actuator;
pub mod pwm;

pub use actuator::Actuator;
pub use pwm::{PwmChannel, PwmLimits, PwmOutput};

/// The two tracker axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Motor {
    Altitude,
    Azimuth,
}

/// Pulse width to apply to one motor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MotorSetpoint {
    pub motor: Motor,
    /// Pulse width in microseconds.
    pub pwm_us: u16,
}
