// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Deferred work: interrupt and timer contexts describe what needs doing, a worker does it later.
//!
//! Submitting is O(1) and never blocks, so it is safe from any interrupt handler. The worker (the
//! main loop on the MCU) drains the queue with [`WorkQueue::take`] and runs each item to
//! completion.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;
use log::warn;

/// A unit of deferred work.
pub trait Deferred: PartialEq {
    /// Whether a second submission of an equal item while the first is still pending should be
    /// folded into the pending one.
    fn coalesces(&self) -> bool;
}

/// Result of [`WorkQueue::submit`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Submit {
    Queued,
    /// An equal coalescing item was already pending.
    AlreadyPending,
    /// No room; the item was discarded.
    Dropped,
}

/// Fixed-capacity queue of pending work items.
pub struct WorkQueue<W, const N: usize> {
    inner: Mutex<RefCell<Deque<W, N>>>,
}

impl<W: Deferred, const N: usize> WorkQueue<W, N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Schedule `work` for the worker.
    pub fn submit(&self, work: W) -> Submit {
        let outcome = critical_section::with(|cs| {
            let mut q = self.inner.borrow_ref_mut(cs);
            if work.coalesces() && q.iter().any(|pending| *pending == work) {
                return Submit::AlreadyPending;
            }
            match q.push_back(work) {
                Ok(()) => Submit::Queued,
                Err(_) => Submit::Dropped,
            }
        });

        if outcome == Submit::Dropped {
            warn!("work queue full, dropping item");
        }
        outcome
    }

    /// Pop the oldest pending item.
    pub fn take(&self) -> Option<W> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop_front())
    }

    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }
}

impl<W: Deferred, const N: usize> Default for WorkQueue<W, N> {
    fn default() -> Self {
        Self::new()
    }
}
