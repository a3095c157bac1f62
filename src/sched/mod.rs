// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Scheduling Fabric
//!
//! Primitives that connect the firmware's producers and consumers without shared mutable state.
//!
//! ## Modules
//!
//! - [`queue`] - Bounded FIFO with clear-then-insert overflow, used between pipeline stages.
//! - [`work`] - Deferred-work queue for interrupt/timer to worker handoff.
//! - [`ring`] - Byte ring buffers for the serial transport.
//! - [`timer`] - Periodic triggers polled against the millisecond clock.

pub mod queue;
pub mod ring;
pub mod timer;
pub mod work;

pub use queue::{BoundedQueue, Sent};
pub use ring::ByteRing;
pub use timer::Periodic;
pub use work::{Deferred, Submit, WorkQueue};
