// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Start-up bias calibration.
//!
//! The tracker must sit still while the first samples arrive. Gyro readings are averaged per axis
//! into a rate bias. The raw accelerometer tilt angles are averaged too; that bias is reported but
//! not applied by the filter.

use crate::math::atan2_deg;
use crate::sensors::ImuSample;

/// Averaged sensor biases.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Biases {
    /// Gyro rate bias, rad/s.
    pub gyro: [f32; 3],
    /// Mean accelerometer tilt angles, degrees.
    pub accel: [f32; 3],
}

/// Running sums over a fixed number of samples.
#[derive(Copy, Clone, Debug)]
pub struct Calibration {
    required: usize,
    count: usize,
    gyro_sum: [f32; 3],
    accel_sum: [f32; 3],
}

impl Calibration {
    pub fn new(required: usize) -> Self {
        Self {
            required,
            count: 0,
            gyro_sum: [0.0; 3],
            accel_sum: [0.0; 3],
        }
    }

    /// Samples taken so far.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Accumulate one sample. Returns the averaged biases once `required` samples have been seen.
    pub fn feed(&mut self, sample: &ImuSample) -> Option<Biases> {
        let a = &sample.accel;
        for (sum, g) in self.gyro_sum.iter_mut().zip(sample.gyro.iter()) {
            *sum += g;
        }
        self.accel_sum[0] += atan2_deg(a[1], a[2]);
        self.accel_sum[1] += atan2_deg(-a[0], a[2]);
        self.accel_sum[2] += atan2_deg(a[1], a[0]);
        self.count += 1;

        if self.count < self.required {
            return None;
        }

        let n = self.count as f32;
        Some(Biases {
            gyro: self.gyro_sum.map(|s| s / n),
            accel: self.accel_sum.map(|s| s / n),
        })
    }
}
