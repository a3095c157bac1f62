// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! Closed-loop attitude control for the two tracker axes.
//!
//! ## Modules
//!
//! - [`pid`] - PID loop with millisecond time base.
//! - [`setpoint`] - Commanded targets and the fallback sweep generator.
//! - [`attitude`] - Altitude/azimuth controller turning attitude frames into motor setpoints.

pub mod attitude;
pub mod pid;
pub mod setpoint;

pub use attitude::AttitudeController;
pub use pid::{PidGains, PidState};
pub use setpoint::{CommandSetpoint, SweepSetpoint};
