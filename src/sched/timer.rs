// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic triggers driven by a millisecond clock.

/// A fixed-period trigger.
///
/// A stopped trigger never fires. After [`Periodic::start`] it first fires one full period later,
/// then once per period. If polling falls behind by more than a period, the missed expiries
/// collapse into a single firing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Periodic {
    period_ms: i64,
    next_due: Option<i64>,
}

impl Periodic {
    /// Create a stopped trigger.
    pub const fn new(period_ms: i64) -> Self {
        Self {
            period_ms,
            next_due: None,
        }
    }

    /// Create a trigger that is already running.
    pub fn started(period_ms: i64, now_ms: i64) -> Self {
        let mut p = Self::new(period_ms);
        p.start(now_ms);
        p
    }

    pub fn start(&mut self, now_ms: i64) {
        self.next_due = Some(now_ms + self.period_ms);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    #[inline]
    pub fn period_ms(&self) -> i64 {
        self.period_ms
    }

    /// Returns true once for every elapsed period.
    pub fn poll(&mut self, now_ms: i64) -> bool {
        match self.next_due {
            Some(due) if now_ms >= due => {
                let mut next = due + self.period_ms;
                if next <= now_ms {
                    next = now_ms + self.period_ms;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }
}
