// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Small fixed-size attitude math: sensor-mount rotations and quaternion conversion.
//!
//! Trigonometry goes through `libm` so results are identical on the MCU and in host tests.

pub mod quaternion;
pub mod rotation;

pub use quaternion::quat_to_euler;
pub use rotation::Mat3;

/// Radians to degrees.
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// `atan2` in degrees.
#[inline]
pub fn atan2_deg(y: f32, x: f32) -> f32 {
    libm::atan2f(y, x) * RAD_TO_DEG
}
