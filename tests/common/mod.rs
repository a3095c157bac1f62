// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host stand-ins for the board peripherals.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::i2c::{Write, WriteRead};

use antenna_tracker::drivers::{hmc5883l, mpu6050};
use antenna_tracker::motors::PwmOutput;

#[derive(Debug, PartialEq, Eq)]
pub struct Nack;

/// One I2C device with a 256-byte register file. Clones share the registers, so a test can keep a
/// handle and change readings after a driver has taken the bus.
#[derive(Clone)]
pub struct FakeDevice {
    address: u8,
    regs: Rc<RefCell<[u8; 256]>>,
    pub fail_reads: Rc<RefCell<bool>>,
}

impl FakeDevice {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: Rc::new(RefCell::new([0; 256])),
            fail_reads: Rc::new(RefCell::new(false)),
        }
    }

    pub fn set(&self, reg: u8, bytes: &[u8]) {
        let mut regs = self.regs.borrow_mut();
        for (i, b) in bytes.iter().enumerate() {
            regs[reg as usize + i] = *b;
        }
    }

    pub fn get(&self, reg: u8) -> u8 {
        self.regs.borrow()[reg as usize]
    }

    /// An MPU-6050 reporting `accel_g` and `gyro_dps` in raw units at the default ranges.
    pub fn mpu6050(accel_g: [f32; 3], gyro_dps: [f32; 3]) -> Self {
        let dev = Self::new(mpu6050::DEFAULT_ADDRESS);
        dev.set(mpu6050::reg::WHO_AM_I, &[mpu6050::DEVICE_ID]);
        dev.set(mpu6050::reg::PWR_MGMT_1, &[0x40]);
        dev.set_motion(accel_g, gyro_dps);
        dev
    }

    pub fn set_motion(&self, accel_g: [f32; 3], gyro_dps: [f32; 3]) {
        let mut raw = [0u8; 14];
        let mut put = |i: usize, v: i16| raw[2 * i..2 * i + 2].copy_from_slice(&v.to_be_bytes());
        for axis in 0..3 {
            put(axis, (accel_g[axis] * 16384.0) as i16);
            put(4 + axis, (gyro_dps[axis] * 131.0) as i16);
        }
        self.set(mpu6050::reg::ACCEL_XOUT_H, &raw);
    }

    /// An HMC5883L reporting `field` in LSB, given in X, Y, Z order.
    pub fn hmc5883l(field: [i16; 3]) -> Self {
        let dev = Self::new(hmc5883l::DEFAULT_ADDRESS);
        dev.set(hmc5883l::reg::ID_A, &hmc5883l::DEVICE_ID);
        let [x, y, z] = field;
        let mut raw = [0u8; 6];
        raw[0..2].copy_from_slice(&x.to_be_bytes());
        raw[2..4].copy_from_slice(&z.to_be_bytes());
        raw[4..6].copy_from_slice(&y.to_be_bytes());
        dev.set(hmc5883l::reg::DATA_X_MSB, &raw);
        dev
    }
}

impl WriteRead for FakeDevice {
    type Error = Nack;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Nack> {
        if address != self.address || bytes.is_empty() || *self.fail_reads.borrow() {
            return Err(Nack);
        }
        let regs = self.regs.borrow();
        for (i, b) in buffer.iter_mut().enumerate() {
            *b = regs[(bytes[0] as usize + i) % 256];
        }
        Ok(())
    }
}

impl Write for FakeDevice {
    type Error = Nack;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Nack> {
        if address != self.address || bytes.is_empty() {
            return Err(Nack);
        }
        let mut regs = self.regs.borrow_mut();
        for (i, b) in bytes[1..].iter().enumerate() {
            regs[(bytes[0] as usize + i) % 256] = *b;
        }
        Ok(())
    }
}

/// PWM output remembering every pulse written.
#[derive(Default)]
pub struct RecordingPwm {
    pub pulses: Vec<(u8, u32, u16, u8)>,
}

impl RecordingPwm {
    /// Most recent pulse width on `channel`.
    pub fn last(&self, channel: u8) -> Option<u16> {
        self.pulses
            .iter()
            .rev()
            .find(|p| p.0 == channel)
            .map(|p| p.2)
    }
}

impl PwmOutput for RecordingPwm {
    type Error = Nack;

    fn set_pulse(
        &mut self,
        channel: u8,
        period_us: u32,
        pulse_us: u16,
        flags: u8,
    ) -> Result<(), Nack> {
        self.pulses.push((channel, period_us, pulse_us, flags));
        Ok(())
    }
}
