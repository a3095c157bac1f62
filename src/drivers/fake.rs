// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! In-memory I2C device for driver tests.

use embedded_hal::blocking::i2c::{Write, WriteRead};

#[derive(Debug, PartialEq, Eq)]
pub struct Nack;

/// A single device with a flat 256-byte register file and auto-incrementing register pointer.
pub struct FakeI2c {
    pub address: u8,
    pub regs: [u8; 256],
}

impl FakeI2c {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: [0; 256],
        }
    }
}

impl WriteRead for FakeI2c {
    type Error = Nack;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Nack> {
        if address != self.address || bytes.is_empty() {
            return Err(Nack);
        }
        let start = bytes[0] as usize;
        for (i, b) in buffer.iter_mut().enumerate() {
            *b = self.regs[(start + i) % 256];
        }
        Ok(())
    }
}

impl Write for FakeI2c {
    type Error = Nack;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Nack> {
        if address != self.address || bytes.is_empty() {
            return Err(Nack);
        }
        let start = bytes[0] as usize;
        for (i, b) in bytes[1..].iter().enumerate() {
            self.regs[(start + i) % 256] = *b;
        }
        Ok(())
    }
}
