// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! CRC-16/MCRF4XX (the X.25 variant MAVLink uses).

/// Running checksum over a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Crc(u16);

impl Crc {
    pub const INIT: u16 = 0xFFFF;

    pub const fn new() -> Self {
        Self(Self::INIT)
    }

    #[inline]
    pub fn accumulate(&mut self, byte: u8) {
        let mut tmp = byte ^ (self.0 as u8);
        tmp ^= tmp << 4;
        let tmp = tmp as u16;
        self.0 = (self.0 >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4);
    }

    pub fn accumulate_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.accumulate(b);
        }
    }

    #[inline]
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl Default for Crc {
    fn default() -> Self {
        Self::new()
    }
}
