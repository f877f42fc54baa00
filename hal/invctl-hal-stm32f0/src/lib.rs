//! STM32F0 implementation of the invctl HAL
//!
//! Wraps `embassy-stm32` GPIO and drives the USART directly through its
//! registers, since the LIN master needs per-byte interrupts and on-the-fly
//! baud switching that the embassy UART driver does not expose.
//!
//! # Features
//!
//! - `stm32f042k6` - STM32F042K6 (inverter auxiliary controller board)
//! - `stm32f042f6` - STM32F042F6 (same die, TSSOP20)
//! - `defmt` - Enable debug formatting support

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod power;
pub mod uart;

pub use gpio::{Stm32Input, Stm32Output};
pub use power::{signal_plug_edge, McuSleep};
pub use uart::{LinUsart, UsartIrq};
