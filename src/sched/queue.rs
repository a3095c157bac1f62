// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-capacity FIFO shared between pipeline stages.
//!
//! Every stage of the pipeline talks to its neighbours through a [`BoundedQueue`]. Senders never
//! block: when the queue is full, [`BoundedQueue::send_latest`] throws away everything still queued
//! and keeps only the new element, so a slow consumer always sees the freshest data. Receivers use
//! `nb` semantics, which gives both a polling form ([`BoundedQueue::try_receive`]) and a blocking
//! form ([`BoundedQueue::receive`]).
//!
//! The queue is guarded by a `critical_section` mutex, so it can be placed in a `static` and
//! shared between interrupt handlers and the main loop (or between threads in host tests).

use core::cell::RefCell;
use core::convert::Infallible;

use critical_section::Mutex;
use heapless::Deque;
use log::warn;

/// Outcome of [`BoundedQueue::send_latest`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    /// The element was appended.
    Queued,
    /// The queue was full; `dropped` stale elements were discarded before appending.
    Flushed { dropped: usize },
}

/// Bounded FIFO with a clear-then-insert overflow policy.
pub struct BoundedQueue<T, const N: usize> {
    name: &'static str,
    inner: Mutex<RefCell<Deque<T, N>>>,
}

impl<T, const N: usize> BoundedQueue<T, N> {
    /// Create an empty queue. `name` only shows up in log messages.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard everything queued. Returns how many elements were dropped.
    pub fn clear(&self) -> usize {
        critical_section::with(|cs| {
            let mut q = self.inner.borrow_ref_mut(cs);
            let dropped = q.len();
            q.clear();
            dropped
        })
    }

    /// Append if there is room, otherwise hand the element back.
    pub fn try_send(&self, item: T) -> Result<(), T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).push_back(item))
    }

    /// Append, purging the queue first if it is full.
    ///
    /// After a purge the queue holds exactly the new element.
    pub fn send_latest(&self, item: T) -> Sent {
        let sent = critical_section::with(|cs| {
            let mut q = self.inner.borrow_ref_mut(cs);
            match q.push_back(item) {
                Ok(()) => Sent::Queued,
                Err(item) => {
                    let dropped = q.len();
                    q.clear();
                    let _ = q.push_back(item);
                    Sent::Flushed { dropped }
                }
            }
        });

        if let Sent::Flushed { dropped } = sent {
            warn!("{}: queue full, dropped {} stale entries", self.name, dropped);
        }
        sent
    }

    /// Take the oldest element, or `WouldBlock` if the queue is empty.
    pub fn try_receive(&self) -> nb::Result<T, Infallible> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop_front())
            .ok_or(nb::Error::WouldBlock)
    }

    /// Spin until an element is available.
    pub fn receive(&self) -> T {
        match nb::block!(self.try_receive()) {
            Ok(item) => item,
            Err(never) => match never {},
        }
    }
}
