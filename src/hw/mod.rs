// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Board Support
//!
//! MCU-level wrappers for the STM32F777 tracker board. Only built with the `firmware` feature.
//!
//! | Peripheral | Use |
//! | ---------- | --- |
//! | USART1 (PA9/PA10) | debug console and `log` output |
//! | USART2 (PD5/PD6) | MAVLink link |
//! | PD3 | link DTR, active low |
//! | I2C1 (PB8/PB9) | MPU-6050 |
//! | I2C2 (PB10/PB11) | HMC5883L |
//! | TIM4 CH1/CH2 (PB6/PB7) | altitude and azimuth servos |
//! | SysTick | 1 ms clock |

pub mod clock;
pub mod pwm;
pub mod usart;

pub use pwm::ServoTimer;
pub use usart::{LinkPort, Usart};
