// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Antenna Tracker Firmware
//!
//! This crate contains the firmware for a two-axis antenna tracker, written in Rust, targeting an
//! STM32F777 MCU. The tracker fuses IMU and magnetometer data into an attitude estimate, drives
//! altitude/azimuth servos toward a commanded target with PID control, and talks MAVLink to a
//! ground station as a gimbal manager.
//!
//! Everything except [`hw`] is hardware-agnostic and builds on the host.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`sched`] | Bounded queues, deferred work, byte rings, periodic triggers |
//! | [`pipeline`] | The queues connecting the real-time stages |
//! | [`sensors`] | Sample types and the sample-source capability |
//! | [`drivers`] | Device-level drivers (MPU-6050, HMC5883L) |
//! | [`estimator`] | Complementary-filter attitude estimation |
//! | [`control`] | PID, attitude controller, setpoint sources |
//! | [`motors`] | Servo pulse mapping and the actuation stage |
//! | [`protocol`] | MAVLink framing, messages, command dispatch, telemetry |
//! | [`transport`] | Serial byte rings between the UART interrupt and the protocol worker |
//! | [`math`] | Rotations and quaternion conversion |
//! | [`config`] | Compile-time configuration |
//! | [`logging`] | Buffered `log` backend drained by the main loop |
//! | `hw` | MCU-level wrappers (`firmware` feature only) |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features firmware
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod control;
pub mod drivers;
pub mod estimator;
pub mod logging;
pub mod math;
pub mod motors;
pub mod pipeline;
pub mod protocol;
pub mod sched;
pub mod sensors;
pub mod transport;

#[cfg(feature = "firmware")]
pub mod hw;
