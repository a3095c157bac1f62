// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Attitude Estimator
//!
//! Complementary filter fusing the IMU and magnetometer into pitch, roll and heading.
//!
//! The estimator starts out calibrating: the first
//! [`calibration_samples`](crate::config::EstimatorConfig::calibration_samples) IMU samples are
//! averaged into a gyro bias. After that, every IMU sample produces one [`AttitudeFrame`]:
//!
//! - the bias-corrected gyro rate is integrated over the sample interval and rotated into the body
//!   frame,
//! - the accelerometer gravity vector gives an absolute tilt,
//! - pitch and roll blend the two (`w * (angle + gyro_delta) + (1 - w) * accel_angle`),
//! - heading comes from the most recent magnetometer sample, held until a newer one arrives.
//!
//! The magnetometer runs much slower than the IMU, so frames are paced by the IMU. No frame is
//! produced until at least one magnetometer sample has been seen.

pub mod calibration;

use core::convert::Infallible;

use log::{debug, info};

use crate::config::EstimatorConfig;
use crate::math::{atan2_deg, RAD_TO_DEG};
use crate::sched::BoundedQueue;
use crate::sensors::{ImuSample, MagSample};

pub use calibration::{Biases, Calibration};

/// Index of pitch in [`AttitudeFrame::angle`].
pub const PITCH: usize = 0;
/// Index of roll in [`AttitudeFrame::angle`].
pub const ROLL: usize = 1;
/// Index of heading in [`AttitudeFrame::angle`].
pub const HEADING: usize = 2;

/// Estimated attitude at one instant.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AttitudeFrame {
    /// Timestamp of the IMU sample this frame was computed from (ms).
    pub timestamp: i64,
    /// `[pitch, roll, heading]` in degrees.
    pub angle: [f32; 3],
}

enum Phase {
    Calibrating(Calibration),
    Running,
}

pub struct Estimator {
    config: EstimatorConfig,
    phase: Phase,
    biases: Biases,

    /// Fused `[pitch, roll]` plus the gyro-only yaw increment of the last step.
    angle: [f32; 3],
    /// Zero-order hold of the magnetometer.
    last_mag: Option<MagSample>,
    prev_timestamp: i64,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            phase: Phase::Calibrating(Calibration::new(config.calibration_samples)),
            config,
            biases: Biases::default(),
            angle: [0.0; 3],
            last_mag: None,
            prev_timestamp: 0,
        }
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        matches!(self.phase, Phase::Running)
    }

    /// Gyro bias found during calibration, rad/s.
    #[inline]
    pub fn gyro_bias(&self) -> [f32; 3] {
        self.biases.gyro
    }

    /// Mean accelerometer tilt found during calibration, degrees.
    ///
    /// Reported only; the filter does not subtract it.
    #[inline]
    pub fn accel_bias(&self) -> [f32; 3] {
        self.biases.accel
    }

    /// Replace the held magnetometer sample.
    pub fn update_mag(&mut self, sample: MagSample) {
        self.last_mag = Some(sample);
    }

    /// Feed one IMU sample. Returns a frame once calibrated and a magnetometer sample is held.
    pub fn update_imu(&mut self, sample: &ImuSample) -> Option<AttitudeFrame> {
        if let Phase::Calibrating(cal) = &mut self.phase {
            if let Some(biases) = cal.feed(sample) {
                info!(
                    "calibration done: gyro bias {:?} rad/s, accel tilt {:?} deg",
                    biases.gyro, biases.accel
                );
                self.biases = biases;
                self.phase = Phase::Running;
            }
            self.prev_timestamp = sample.timestamp;
            return None;
        }

        let dt = (sample.timestamp - self.prev_timestamp) as f32 / 1000.0;
        self.prev_timestamp = sample.timestamp;

        let mag = match &self.last_mag {
            Some(mag) => mag.mag,
            None => {
                debug!("waiting for first magnetometer sample");
                return None;
            }
        };

        let mut gyro_delta = [0.0f32; 3];
        for i in 0..3 {
            let rate_deg = (sample.gyro[i] - self.biases.gyro[i]) * RAD_TO_DEG;
            gyro_delta[i] = rate_deg * dt;
        }
        let gyro_delta = self.config.imu_rotation.apply(gyro_delta);
        let accel = self.config.imu_rotation.apply(sample.accel);

        let accel_angle = [
            atan2_deg(accel[1], accel[2]),
            atan2_deg(-accel[0], accel[2]),
            atan2_deg(-accel[1], -accel[0]),
        ];

        let mag = self.config.mag_calibration.apply(mag);
        let mag = self.config.mag_rotation.apply(mag);
        let heading = atan2_deg(mag[1], mag[0]);

        let w = self.config.gyro_weight;
        self.angle[PITCH] =
            w * (self.angle[PITCH] + gyro_delta[PITCH]) + (1.0 - w) * accel_angle[PITCH];
        self.angle[ROLL] =
            w * (self.angle[ROLL] + gyro_delta[ROLL]) + (1.0 - w) * accel_angle[ROLL];
        self.angle[HEADING] = gyro_delta[HEADING];

        Some(AttitudeFrame {
            timestamp: sample.timestamp,
            angle: [self.angle[PITCH], self.angle[ROLL], heading],
        })
    }

    /// Run one pipeline iteration.
    ///
    /// Takes the next IMU sample (`WouldBlock` if none is queued), picks up a newer magnetometer
    /// sample if there is one, and publishes the resulting frame with clear-then-insert.
    pub fn step<const I: usize, const M: usize, const A: usize>(
        &mut self,
        imu: &BoundedQueue<ImuSample, I>,
        mag: &BoundedQueue<MagSample, M>,
        attitude: &BoundedQueue<AttitudeFrame, A>,
    ) -> nb::Result<Option<AttitudeFrame>, Infallible> {
        let sample = imu.try_receive()?;
        if let Ok(m) = mag.try_receive() {
            self.update_mag(m);
        }

        let frame = self.update_imu(&sample);
        if let Some(frame) = frame {
            attitude.send_latest(frame);
        }
        Ok(frame)
    }
}
