// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PID controller for the attitude loops.
//!
//! Works in `no_std` and does not allocate memory. Time is supplied by the caller as a millisecond
//! timestamp, so the controller runs at whatever rate attitude frames arrive.

/// Fixed gains of one PID loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }
}

/// State of one PID loop. Output is normalized to `[-1, 1]`.
///
/// The integrator accumulates the raw error every cycle and is not clamped, so a long-standing
/// error keeps growing the I term until the output saturates.
#[derive(Clone, Debug)]
pub struct PidState {
    gains: PidGains,

    /// Sum of all errors seen so far.
    integral: f32,
    prev_error: f32,
    cur_error: f32,
    /// Timestamps (ms) of the previous and current cycle.
    prev_time: i64,
    cur_time: i64,
}

impl PidState {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: 0.0,
            cur_error: 0.0,
            prev_time: 0,
            cur_time: 0,
        }
    }

    #[inline]
    pub fn gains(&self) -> PidGains {
        self.gains
    }

    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Set the time base so the first [`process`](Self::process) call sees a real interval.
    pub fn prime(&mut self, now_ms: i64) {
        self.prev_time = now_ms;
        self.cur_time = now_ms;
    }

    /// Run one cycle.
    ///
    /// `measured` - current value
    /// `target` - desired value
    /// `now_ms` - timestamp of the measurement
    ///
    /// If no time has passed since the previous cycle the D term is zero for this cycle.
    pub fn process(&mut self, measured: f32, target: f32, now_ms: i64) -> f32 {
        self.prev_error = self.cur_error;
        self.prev_time = self.cur_time;
        self.cur_time = now_ms;
        self.cur_error = target - measured;
        self.integral += self.cur_error;

        let dt = (self.cur_time - self.prev_time) as f32 / 1000.0;

        let p = self.gains.kp * self.cur_error;
        let i = self.gains.ki * self.integral;
        let d = if dt > 0.0 {
            self.gains.kd * ((self.cur_error - self.prev_error) / dt)
        } else {
            0.0
        };

        let out = p + i + d;
        if out.is_nan() {
            return 0.0;
        }
        out.clamp(-1.0, 1.0)
    }
}
