// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration for the tracker.
//!
//! Everything that differs between builds of the tracker lives here: controller gains, actuator
//! limits, sensor mounting, magnetometer calibration, protocol identity and the periods of every
//! periodic trigger. [`TrackerConfig::default`] carries the values the flight hardware was tuned
//! with; the `with_*` builders override individual pieces.

use crate::control::PidGains;
use crate::math::Mat3;
use crate::motors::{PwmChannel, PwmLimits};

/// Queue depths of the real-time pipeline.
pub mod capacity {
    /// IMU samples waiting for the estimator.
    pub const IMU: usize = 4;
    /// Magnetometer samples waiting for the estimator.
    pub const MAG: usize = 4;
    /// Attitude frames waiting for the controller.
    pub const ATTITUDE: usize = 4;
    /// Command setpoints waiting for the controller.
    pub const COMMAND: usize = 2;
    /// Motor setpoints waiting for actuation.
    pub const MOTOR: usize = 4;
    /// Size of each transport byte ring (receive and transmit).
    pub const RING: usize = 2048;
    /// Deferred protocol work items.
    pub const WORK: usize = 16;
    /// Formatted log records waiting for the debug console, in bytes.
    pub const LOG: usize = 2048;
}

/// Hard-iron offsets and soft-iron scale factors for the magnetometer, per axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MagCalibration {
    pub offset: [f32; 3],
    pub scale: [f32; 3],
}

impl MagCalibration {
    /// Calibration with no offset and unit scale.
    pub const NONE: Self = Self {
        offset: [0.0; 3],
        scale: [1.0; 3],
    };

    /// Apply `(raw - offset) * scale` on every axis.
    #[inline]
    pub fn apply(&self, raw: [f32; 3]) -> [f32; 3] {
        [
            (raw[0] - self.offset[0]) * self.scale[0],
            (raw[1] - self.offset[1]) * self.scale[1],
            (raw[2] - self.offset[2]) * self.scale[2],
        ]
    }
}

impl Default for MagCalibration {
    fn default() -> Self {
        Self {
            offset: [-0.282569, -0.363303, -0.325688],
            scale: [1.125176, 0.976801, 0.919540],
        }
    }
}

/// Estimator tuning and sensor mounting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// IMU samples averaged for the gyro bias before the filter starts.
    pub calibration_samples: usize,
    /// Weight of the gyro-integrated angle in the complementary blend.
    pub gyro_weight: f32,
    /// Sensor-to-body rotation for the IMU.
    pub imu_rotation: Mat3,
    /// Sensor-to-body rotation for the magnetometer.
    pub mag_rotation: Mat3,
    pub mag_calibration: MagCalibration,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            calibration_samples: 250,
            gyro_weight: 0.98,
            imu_rotation: Mat3([[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]]),
            mag_rotation: Mat3::IDENTITY,
            mag_calibration: MagCalibration::default(),
        }
    }
}

/// MAVLink identity and telemetry rates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProtocolConfig {
    pub system_id: u8,
    pub component_id: u8,
    pub heartbeat_period_ms: i64,
    pub manager_status_period_ms: i64,
    pub attitude_status_period_ms: i64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            system_id: 220,
            component_id: crate::protocol::messages::MAV_COMP_ID_GIMBAL,
            heartbeat_period_ms: 1000,
            manager_status_period_ms: 200,
            attitude_status_period_ms: 100,
        }
    }
}

/// Local altitude sweep used while no ground station is commanding the tracker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepConfig {
    pub step_deg: f32,
    pub max_deg: f32,
    pub period_ms: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            step_deg: 15.0,
            max_deg: 60.0,
            period_ms: 2000,
        }
    }
}

/// Top-level configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    pub altitude_gains: PidGains,
    pub azimuth_gains: PidGains,
    pub pwm_limits: PwmLimits,
    pub altitude_channel: PwmChannel,
    pub azimuth_channel: PwmChannel,
    pub estimator: EstimatorConfig,
    pub protocol: ProtocolConfig,
    pub sweep: SweepConfig,
    pub imu_poll_period_ms: i64,
    pub mag_poll_period_ms: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let gains = PidGains::new(0.025, 0.00001, 0.00001);
        Self {
            altitude_gains: gains,
            azimuth_gains: gains,
            pwm_limits: PwmLimits::SERVO,
            altitude_channel: PwmChannel::servo(0),
            azimuth_channel: PwmChannel::servo(1),
            estimator: EstimatorConfig::default(),
            protocol: ProtocolConfig::default(),
            sweep: SweepConfig::default(),
            imu_poll_period_ms: 1,
            mag_poll_period_ms: 100,
        }
    }
}

impl TrackerConfig {
    /// Override the gains of both axes.
    pub fn with_gains(mut self, altitude: PidGains, azimuth: PidGains) -> Self {
        self.altitude_gains = altitude;
        self.azimuth_gains = azimuth;
        self
    }

    /// Override the estimator configuration.
    pub fn with_estimator(mut self, estimator: EstimatorConfig) -> Self {
        self.estimator = estimator;
        self
    }
}
