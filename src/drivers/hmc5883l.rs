// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Honeywell HMC5883L three-axis magnetometer over I2C.
//!
//! Configured for 8-sample averaging at 15 Hz, ±1.3 Ga range and continuous measurement. Samples
//! are reported in gauss.

use embedded_hal::blocking::i2c::{Write, WriteRead};
use log::debug;

use crate::sensors::{Error, MagSample, SampleSource};

pub const DEFAULT_ADDRESS: u8 = 0x1E;

// Register addresses
pub mod reg {
    pub const CONFIG_A: u8 = 0x00;
    pub const CONFIG_B: u8 = 0x01;
    pub const MODE: u8 = 0x02;
    /// First of six data registers, ordered X, Z, Y (MSB first).
    pub const DATA_X_MSB: u8 = 0x03;
    pub const ID_A: u8 = 0x0A;
}

/// Identification registers A..C spell "H43".
pub const DEVICE_ID: [u8; 3] = *b"H43";

/// 8-sample average, 15 Hz, normal measurement.
const CONFIG_A_VALUE: u8 = 0x70;
/// Gain 1, ±1.3 Ga.
const CONFIG_B_VALUE: u8 = 0x20;
const MODE_CONTINUOUS: u8 = 0x00;
/// LSB per gauss at gain 1.
const LSB_PER_GAUSS: f32 = 1090.0;

pub struct Hmc5883l<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Hmc5883l<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
{
    /// Check the identification registers and start continuous measurement.
    pub fn new(i2c: I2C, address: u8) -> Result<Self, Error<E>> {
        let mut dev = Self { i2c, address };

        let mut id = [0u8; 3];
        dev.i2c
            .write_read(address, &[reg::ID_A], &mut id)
            .map_err(Error::Bus)?;
        if id != DEVICE_ID {
            return Err(Error::WrongDevice {
                expected: DEVICE_ID[0],
                found: id[0],
            });
        }

        dev.i2c
            .write(address, &[reg::CONFIG_A, CONFIG_A_VALUE])
            .map_err(Error::Bus)?;
        dev.i2c
            .write(address, &[reg::CONFIG_B, CONFIG_B_VALUE])
            .map_err(Error::Bus)?;
        dev.i2c
            .write(address, &[reg::MODE, MODE_CONTINUOUS])
            .map_err(Error::Bus)?;
        debug!("hmc5883l at {:#04x} measuring", address);
        Ok(dev)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn sample(&mut self, timestamp: i64) -> Result<MagSample, Error<E>> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(self.address, &[reg::DATA_X_MSB], &mut raw)
            .map_err(Error::Bus)?;

        let gauss =
            |i: usize| i16::from_be_bytes([raw[2 * i], raw[2 * i + 1]]) as f32 / LSB_PER_GAUSS;
        Ok(MagSample {
            timestamp,
            mag: [gauss(0), gauss(2), gauss(1)],
        })
    }
}

impl<I2C, E> SampleSource for Hmc5883l<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
    E: core::fmt::Debug,
{
    type Sample = MagSample;
    type Error = Error<E>;

    fn read(&mut self, timestamp: i64) -> Result<MagSample, Error<E>> {
        self.sample(timestamp)
    }
}
