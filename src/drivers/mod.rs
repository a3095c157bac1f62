// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Register-level sensor drivers written against the `embedded-hal` 0.2 blocking I2C traits, so
//! they run on the MCU's I2C peripherals and on in-memory fakes in tests alike.
//!
//! ## Existing drivers
//!
//! - [`mpu6050`] – InvenSense MPU-6050 accelerometer/gyroscope
//! - [`hmc5883l`] – Honeywell HMC5883L three-axis magnetometer

pub mod hmc5883l;
pub mod mpu6050;

pub use hmc5883l::Hmc5883l;
pub use mpu6050::Mpu6050;

#[cfg(test)]
pub(crate) mod fake;
