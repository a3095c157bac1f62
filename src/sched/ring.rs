// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte ring buffer shared between a UART interrupt and the protocol worker.
//!
//! Writes are partial: [`ByteRing::put`] stores what fits and reports how much that was. The ring
//! never grows and never overwrites unread bytes.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

pub struct ByteRing<const N: usize> {
    inner: Mutex<RefCell<Deque<u8, N>>>,
}

impl<const N: usize> ByteRing<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Copy as many bytes of `data` as there is space for. Returns the number copied.
    pub fn put(&self, data: &[u8]) -> usize {
        critical_section::with(|cs| {
            let mut ring = self.inner.borrow_ref_mut(cs);
            let n = data.len().min(N - ring.len());
            for &b in &data[..n] {
                let _ = ring.push_back(b);
            }
            n
        })
    }

    /// Move up to `out.len()` bytes out of the ring. Returns the number moved.
    pub fn get(&self, out: &mut [u8]) -> usize {
        critical_section::with(|cs| {
            let mut ring = self.inner.borrow_ref_mut(cs);
            let mut n = 0;
            while n < out.len() {
                match ring.pop_front() {
                    Some(b) => {
                        out[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            n
        })
    }

    /// Free space in bytes.
    pub fn space(&self) -> usize {
        N - self.len()
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_is_truncated_to_free_space() {
        let ring: ByteRing<8> = ByteRing::new();
        assert_eq!(ring.put(&[1, 2, 3, 4, 5]), 5);
        assert_eq!(ring.space(), 3);
        assert_eq!(ring.put(&[6, 7, 8, 9, 10]), 3);
        assert_eq!(ring.space(), 0);
        assert_eq!(ring.put(&[11]), 0);

        let mut out = [0u8; 16];
        assert_eq!(ring.get(&mut out), 8);
        assert_eq!(&out[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(ring.is_empty());
    }

    #[test]
    fn get_is_bounded_by_output_slice() {
        let ring: ByteRing<8> = ByteRing::new();
        ring.put(&[1, 2, 3]);
        let mut out = [0u8; 2];
        assert_eq!(ring.get(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(ring.len(), 1);
    }
}
