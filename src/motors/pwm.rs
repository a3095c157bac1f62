// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Servo pulse generation.

use micromath::F32Ext;

/// Pulse-width range of a servo-style actuator, in microseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PwmLimits {
    pub min_us: u16,
    /// Neutral position; a normalized output of 0 maps here exactly.
    pub center_us: u16,
    pub max_us: u16,
}

impl PwmLimits {
    /// Standard RC servo / ESC range.
    pub const SERVO: Self = Self {
        min_us: 1000,
        center_us: 1500,
        max_us: 2000,
    };

    /// Map a normalized output in `[-1, 1]` to a pulse width.
    ///
    /// Positive and negative outputs are scaled separately so the range need not be symmetric
    /// around the center. Fractional microseconds are truncated.
    pub fn pulse_width_us(&self, output: f32) -> u16 {
        let output = output.clamp(-1.0, 1.0);
        let center = self.center_us as f32;
        let pwm = if output >= 0.0 {
            output * (self.max_us as f32 - center) + center
        } else {
            output * (center - self.min_us as f32) + center
        };
        pwm as u16
    }
}

/// One PWM output as the actuator contract sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PwmChannel {
    pub channel: u8,
    /// Frame period in microseconds.
    pub period_us: u32,
    /// Board-specific output flags (e.g. inverted polarity).
    pub flags: u8,
}

impl PwmChannel {
    /// Flag: output is active-low.
    pub const INVERTED: u8 = 1 << 0;

    /// A 50 Hz servo output on `channel`.
    pub const fn servo(channel: u8) -> Self {
        Self {
            channel,
            period_us: 20_000,
            flags: 0,
        }
    }

    /// Convert a pulse width into a timer compare value for a timer whose full period is
    /// `max_duty` counts.
    pub fn duty(&self, pulse_us: u16, max_duty: u16) -> u16 {
        if self.period_us == 0 {
            return 0;
        }
        let frac = (pulse_us as f32 / self.period_us as f32).min(1.0);
        let frac = if self.flags & Self::INVERTED != 0 {
            1.0 - frac
        } else {
            frac
        };
        F32Ext::round(frac * max_duty as f32) as u16
    }
}

/// Anything that can emit a pulse on a numbered channel.
pub trait PwmOutput {
    type Error: core::fmt::Debug;

    fn set_pulse(
        &mut self,
        channel: u8,
        period_us: u32,
        pulse_us: u16,
        flags: u8,
    ) -> Result<(), Self::Error>;
}
