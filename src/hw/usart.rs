// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer.
//!
//! [`Usart`] is the debug console the buffered logger drains into. [`LinkPort`] is the
//! interrupt-driven MAVLink port: its interrupt handler moves bytes between the hardware and the
//! [`SerialLink`](crate::transport::SerialLink) rings.
//!
//! To access the debug terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use stm32f7xx_hal::{
    prelude::*,
    serial::{Event, Instance, Pins, Serial, Tx},
};

use crate::config::capacity;
use crate::protocol::Work;
use crate::sched::WorkQueue;
use crate::transport::{SerialLink, FIFO_CHUNK};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    /// Hand one byte to the transmitter if it can take it. Never waits.
    #[inline]
    pub fn try_write_byte(&mut self, b: u8) -> bool {
        self.tx.write(b).is_ok()
    }
}

/// Interrupt-driven serial port carrying the MAVLink link.
pub struct LinkPort<U: Instance, PINS> {
    serial: Serial<U, PINS>,
    /// Byte taken from the transmit ring that the transmitter has not accepted yet.
    pending: Option<u8>,
}

impl<U: Instance, PINS: Pins<U>> LinkPort<U, PINS> {
    /// Take ownership of the port and enable the receive interrupt.
    pub fn new(mut serial: Serial<U, PINS>) -> Self {
        serial.listen(Event::Rxne);
        Self {
            serial,
            pending: None,
        }
    }

    /// Enable the transmit-empty interrupt so queued bytes start flowing.
    #[inline]
    pub fn start_tx(&mut self) {
        self.serial.listen(Event::Txe);
    }

    /// Body of the port's interrupt handler.
    pub fn service(&mut self, link: &SerialLink, work: &WorkQueue<Work, { capacity::WORK }>) {
        let mut rx = [0u8; FIFO_CHUNK];
        let mut n = 0;
        while n < rx.len() {
            match self.serial.read() {
                Ok(b) => {
                    rx[n] = b;
                    n += 1;
                }
                Err(_) => break,
            }
        }
        if n > 0 {
            link.on_rx(&rx[..n], work);
        }

        if self.pending.is_none() {
            let mut b = [0u8];
            if link.on_tx_ready(&mut b) == 1 {
                self.pending = Some(b[0]);
            }
        }
        match self.pending {
            Some(b) => {
                if self.serial.write(b).is_ok() {
                    self.pending = None;
                }
            }
            None => self.serial.unlisten(Event::Txe),
        }
    }
}
