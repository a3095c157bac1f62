// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Millisecond system clock on SysTick.

use core::cell::Cell;

use cortex_m::peripheral::{syst::SystClkSource, SYST};
use critical_section::Mutex;

static TICKS_MS: Mutex<Cell<i64>> = Mutex::new(Cell::new(0));

/// Start SysTick at 1 kHz from the core clock.
pub fn start(mut syst: SYST, sysclk_hz: u32) -> SYST {
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(sysclk_hz / 1_000 - 1);
    syst.clear_current();
    syst.enable_counter();
    syst.enable_interrupt();
    syst
}

/// Advance the clock by one tick. Called from the SysTick handler.
pub fn tick() -> i64 {
    critical_section::with(|cs| {
        let t = TICKS_MS.borrow(cs);
        let now = t.get() + 1;
        t.set(now);
        now
    })
}

/// Milliseconds since [`start`].
pub fn now_ms() -> i64 {
    critical_section::with(|cs| TICKS_MS.borrow(cs).get())
}
