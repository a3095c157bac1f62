// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Sensor Samples
//!
//! Sample types produced by the inertial and magnetic sensors, and the capability trait the
//! estimator's producers are written against. Concrete register-level drivers live in
//! [`crate::drivers`].

use core::fmt::Debug;

use log::error;

use crate::sched::BoundedQueue;

/// One reading of the accelerometer/gyroscope pair.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ImuSample {
    /// Monotonic time in milliseconds.
    pub timestamp: i64,
    /// Specific force, m/s².
    pub accel: [f32; 3],
    /// Angular rate, rad/s.
    pub gyro: [f32; 3],
    /// Die temperature, °C.
    pub temp: f32,
}

/// One reading of the magnetometer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MagSample {
    /// Monotonic time in milliseconds.
    pub timestamp: i64,
    /// Field strength in sensor units (gauss for the HMC5883L).
    pub mag: [f32; 3],
}

/// Error type shared by the sensor drivers.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Bus transaction failed.
    Bus(E),
    /// The identity register did not hold the expected value.
    WrongDevice { expected: u8, found: u8 },
}

/// Anything that can be asked for a fresh sample.
pub trait SampleSource {
    type Sample;
    type Error: Debug;

    /// Read one sample and stamp it with `timestamp` (ms).
    fn read(&mut self, timestamp: i64) -> Result<Self::Sample, Self::Error>;
}

/// Read `source` once and enqueue the sample.
///
/// A failed read is logged and skipped. A full queue is purged before inserting. Returns whether
/// a sample was enqueued.
pub fn produce<S, const N: usize>(
    source: &mut S,
    queue: &BoundedQueue<S::Sample, N>,
    now_ms: i64,
) -> bool
where
    S: SampleSource,
{
    match source.read(now_ms) {
        Ok(sample) => {
            queue.send_latest(sample);
            true
        }
        Err(e) => {
            error!("{}: sample failed: {:?}", queue.name(), e);
            false
        }
    }
}
