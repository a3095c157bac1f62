// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! InvenSense MPU-6050 accelerometer/gyroscope over I2C.
//!
//! The driver wakes the device at its power-on ranges (±2 g, ±250 °/s) and reads all seven
//! measurement registers in one burst.

use core::f32::consts::PI;

use embedded_hal::blocking::i2c::{Write, WriteRead};
use log::debug;

use crate::sensors::{Error, ImuSample, SampleSource};

pub const DEFAULT_ADDRESS: u8 = 0x68;

// Register addresses
pub mod reg {
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

/// Expected WHO_AM_I contents.
pub const DEVICE_ID: u8 = 0x68;

/// LSB per g at ±2 g.
const ACCEL_LSB_PER_G: f32 = 16384.0;
/// LSB per °/s at ±250 °/s.
const GYRO_LSB_PER_DPS: f32 = 131.0;
const STANDARD_GRAVITY: f32 = 9.80665;

pub struct Mpu6050<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Mpu6050<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
{
    /// Probe the device and take it out of sleep.
    pub fn new(i2c: I2C, address: u8) -> Result<Self, Error<E>> {
        let mut dev = Self { i2c, address };

        let id = dev.read_reg(reg::WHO_AM_I).map_err(Error::Bus)?;
        if id != DEVICE_ID {
            return Err(Error::WrongDevice {
                expected: DEVICE_ID,
                found: id,
            });
        }
        dev.write_reg(reg::PWR_MGMT_1, 0x00).map_err(Error::Bus)?;
        debug!("mpu6050 at {:#04x} awake", address);
        Ok(dev)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, E> {
        let mut buf = [0u8];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[reg, value])
    }

    /// Read accel, temperature and gyro in one transaction.
    pub fn sample(&mut self, timestamp: i64) -> Result<ImuSample, Error<E>> {
        let mut raw = [0u8; 14];
        self.i2c
            .write_read(self.address, &[reg::ACCEL_XOUT_H], &mut raw)
            .map_err(Error::Bus)?;

        let word = |i: usize| i16::from_be_bytes([raw[2 * i], raw[2 * i + 1]]) as f32;
        let accel = |i: usize| word(i) / ACCEL_LSB_PER_G * STANDARD_GRAVITY;
        let gyro = |i: usize| word(i) / GYRO_LSB_PER_DPS * (PI / 180.0);

        Ok(ImuSample {
            timestamp,
            accel: [accel(0), accel(1), accel(2)],
            temp: word(3) / 340.0 + 36.53,
            gyro: [gyro(4), gyro(5), gyro(6)],
        })
    }
}

impl<I2C, E> SampleSource for Mpu6050<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
    E: core::fmt::Debug,
{
    type Sample = ImuSample;
    type Error = Error<E>;

    fn read(&mut self, timestamp: i64) -> Result<ImuSample, Error<E>> {
        self.sample(timestamp)
    }
}
