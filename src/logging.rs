// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Deferred `log` backend.
//!
//! [`BufferedLogger::log`] only formats the record and copies it into a RAM ring, so a record
//! emitted from an interrupt handler costs a short critical section and never waits on the
//! console. The main loop calls [`BufferedLogger::drain`] to hand buffered bytes to the console
//! as fast as the console accepts them.
//!
//! Records are stored whole or not at all. When the ring cannot take a record it is counted, and
//! the next drain reports how many were lost.

use core::cell::RefCell;
use core::fmt::Write;

use critical_section::Mutex;
use heapless::{Deque, String};
use log::{LevelFilter, Log, Metadata, Record};

/// Longest formatted record, excluding the line ending. Longer records are cut short.
pub const MAX_LINE: usize = 128;

struct Inner<const N: usize> {
    ring: Deque<u8, N>,
    dropped: u32,
}

pub struct BufferedLogger<const N: usize> {
    level: LevelFilter,
    inner: Mutex<RefCell<Inner<N>>>,
}

impl<const N: usize> BufferedLogger<N> {
    pub const fn new(level: LevelFilter) -> Self {
        Self {
            level,
            inner: Mutex::new(RefCell::new(Inner {
                ring: Deque::new(),
                dropped: 0,
            })),
        }
    }

    /// Install as the global logger.
    pub fn register_static(&'static self) {
        critical_section::with(|_cs| unsafe {
            // Interrupts are masked, so nothing else can be racing the logger slot.
            let _ = log::set_logger_racy(self);
            log::set_max_level_racy(self.level);
        });
    }

    /// Bytes waiting for the console.
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).ring.len())
    }

    /// Hand buffered bytes to `write` until the ring is empty or `write` refuses a byte.
    ///
    /// `write` must not block; returning `false` leaves the byte at the front of the ring for the
    /// next call. Returns the number of bytes written.
    pub fn drain(&self, mut write: impl FnMut(u8) -> bool) -> usize {
        self.report_dropped();

        let mut written = 0;
        loop {
            let front =
                critical_section::with(|cs| self.inner.borrow_ref(cs).ring.front().copied());
            let Some(byte) = front else { break };
            if !write(byte) {
                break;
            }
            critical_section::with(|cs| {
                self.inner.borrow_ref_mut(cs).ring.pop_front();
            });
            written += 1;
        }
        written
    }

    /// Queue a notice for records lost since the last one, once there is room for it.
    fn report_dropped(&self) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.dropped == 0 {
                return;
            }
            let mut notice: String<48> = String::new();
            let _ = write!(notice, "[WARN log] dropped {} records\r\n", inner.dropped);
            if N - inner.ring.len() >= notice.len() {
                for &b in notice.as_bytes() {
                    let _ = inner.ring.push_back(b);
                }
                inner.dropped = 0;
            }
        });
    }

    /// Append `line` and `ending` as one unit, or count a dropped record.
    fn push_line(&self, line: &[u8], ending: &[u8]) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if N - inner.ring.len() < line.len() + ending.len() {
                inner.dropped = inner.dropped.saturating_add(1);
                return;
            }
            for &b in line.iter().chain(ending) {
                let _ = inner.ring.push_back(b);
            }
        });
    }
}

impl<const N: usize> Log for BufferedLogger<N> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // An overflowing write leaves the line cut at the last piece that fit.
        let mut line: String<MAX_LINE> = String::new();
        let _ = write!(
            line,
            "[{} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
        self.push_line(line.as_bytes(), b"\r\n");
    }

    fn flush(&self) {}
}
