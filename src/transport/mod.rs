// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Serial Transport
//!
//! Two byte rings between the UART interrupt and the protocol worker.
//!
//! The receive interrupt calls [`SerialLink::on_rx`], which stores what fits in the receive ring
//! and schedules [`Work::ParseInbound`]. The transmit-ready interrupt calls
//! [`SerialLink::on_tx_ready`] to pull the next chunk for the hardware FIFO; a zero return means
//! the ring is drained and the interrupt can be disabled until the worker queues more.

use log::error;

use crate::config::capacity;
use crate::protocol::Work;
use crate::sched::{ByteRing, WorkQueue};

/// Largest chunk moved per interrupt.
pub const FIFO_CHUNK: usize = 64;

pub struct SerialLink {
    rx: ByteRing<{ capacity::RING }>,
    tx: ByteRing<{ capacity::RING }>,
}

impl SerialLink {
    pub const fn new() -> Self {
        Self {
            rx: ByteRing::new(),
            tx: ByteRing::new(),
        }
    }

    /// Interrupt side: bytes arrived from the wire.
    ///
    /// Returns how many were stored. Bytes beyond the free space are dropped.
    pub fn on_rx<const W: usize>(&self, bytes: &[u8], work: &WorkQueue<Work, W>) -> usize {
        let stored = self.rx.put(bytes);
        if stored < bytes.len() {
            error!("rx ring full, dropped {} bytes", bytes.len() - stored);
        }
        if stored > 0 {
            work.submit(Work::ParseInbound);
        }
        stored
    }

    /// Interrupt side: the transmitter can take more bytes.
    ///
    /// Copies at most [`FIFO_CHUNK`] bytes into `out`. Returns 0 once the transmit ring is empty.
    pub fn on_tx_ready(&self, out: &mut [u8]) -> usize {
        let n = out.len().min(FIFO_CHUNK);
        self.tx.get(&mut out[..n])
    }

    /// Worker side: take received bytes.
    pub fn read_inbound(&self, out: &mut [u8]) -> usize {
        self.rx.get(out)
    }

    /// Worker side: queue bytes for transmission.
    ///
    /// Stores what fits and returns how many bytes were dropped.
    pub fn queue_outbound(&self, bytes: &[u8]) -> usize {
        let stored = self.tx.put(bytes);
        let dropped = bytes.len() - stored;
        if dropped > 0 {
            error!("dropping {} bytes", dropped);
        }
        dropped
    }

    #[inline]
    pub fn inbound_pending(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn outbound_pending(&self) -> usize {
        self.tx.len()
    }

    #[inline]
    pub fn outbound_space(&self) -> usize {
        self.tx.space()
    }
}

impl Default for SerialLink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_schedules_a_single_parse() {
        let link = SerialLink::new();
        let work: WorkQueue<Work, 4> = WorkQueue::new();

        assert_eq!(link.on_rx(&[1, 2, 3], &work), 3);
        assert_eq!(link.on_rx(&[4], &work), 1);
        assert_eq!(work.pending(), 1);
        assert_eq!(work.take(), Some(Work::ParseInbound));

        let mut buf = [0u8; 8];
        assert_eq!(link.read_inbound(&mut buf), 4);
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn rx_overflow_keeps_what_fits() {
        let link = SerialLink::new();
        let work: WorkQueue<Work, 4> = WorkQueue::new();
        let big = [0xAAu8; capacity::RING + 10];
        assert_eq!(link.on_rx(&big, &work), capacity::RING);
        assert_eq!(link.on_rx(&[1], &work), 0);
        assert_eq!(link.inbound_pending(), capacity::RING);
    }

    #[test]
    fn tx_drains_in_fifo_chunks() {
        let link = SerialLink::new();
        assert_eq!(link.queue_outbound(&[7u8; 100]), 0);

        let mut out = [0u8; 128];
        assert_eq!(link.on_tx_ready(&mut out), FIFO_CHUNK);
        assert_eq!(link.on_tx_ready(&mut out), 100 - FIFO_CHUNK);
        assert_eq!(link.on_tx_ready(&mut out), 0);
    }

    #[test]
    fn tx_overflow_reports_dropped() {
        let link = SerialLink::new();
        assert_eq!(link.queue_outbound(&[0u8; capacity::RING - 5]), 0);
        assert_eq!(link.queue_outbound(&[0u8; 12]), 7);
        assert_eq!(link.outbound_space(), 0);
    }
}
