// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Servo PWM on TIM4.
//!
//! TIM4 is configured at register level with a 1 MHz tick, so the auto-reload value is the frame
//! period in microseconds and a compare value is a pulse width in microseconds. CH1 (PB6) and CH2
//! (PB7) run in PWM mode 1 with preloaded compare registers.

use stm32f7xx_hal::pac;

use crate::motors::{PwmChannel, PwmOutput};

/// OCxM = PWM mode 1, OCxPE = preload enable.
const OC_PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3);

/// Requested channel is not wired on this board.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NoSuchChannel(pub u8);

pub struct ServoTimer {
    tim: pac::TIM4,
    max_duty: u16,
}

impl ServoTimer {
    /// Configure TIM4 for a `period_us` frame. `timclk_hz` is the APB1 timer clock.
    pub fn tim4(tim4: pac::TIM4, timclk_hz: u32, period_us: u16) -> Self {
        // Peripheral clock
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        let tim = tim4;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // 1 MHz tick, one frame per period
        let psc = (timclk_hz / 1_000_000).saturating_sub(1);
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(period_us.saturating_sub(1) as u32) });

        // CH1/CH2 in PWM mode 1, outputs idle until the first setpoint
        tim.ccmr1_output()
            .write(|w| unsafe { w.bits(OC_PWM1_PRELOAD | (OC_PWM1_PRELOAD << 8)) });
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });
        tim.ccer.modify(|_, w| w.cc1e().set_bit().cc2e().set_bit());

        // Latch prescaler and reload, then start
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.arpe().set_bit().cen().set_bit());

        Self {
            tim,
            max_duty: period_us,
        }
    }
}

impl PwmOutput for ServoTimer {
    type Error = NoSuchChannel;

    fn set_pulse(
        &mut self,
        channel: u8,
        period_us: u32,
        pulse_us: u16,
        flags: u8,
    ) -> Result<(), NoSuchChannel> {
        let duty = PwmChannel {
            channel,
            period_us,
            flags,
        }
        .duty(pulse_us, self.max_duty) as u32;

        match channel {
            0 => self.tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            1 => self.tim.ccr2.write(|w| unsafe { w.bits(duty) }),
            other => return Err(NoSuchChannel(other)),
        }
        Ok(())
    }
}
