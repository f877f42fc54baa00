//! invctl Hardware Abstraction Layer
//!
//! This crate defines the capabilities the supervisor logic needs from the
//! microcontroller. Chip-specific HALs implement them; the core crate only
//! ever sees these traits, which keeps it testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  invctl-firmware (board wiring, ISRs)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  invctl-core (LIN master, supervisor)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  invctl-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  invctl-hal-  │
//!             │    stm32f0    │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Discrete signals
//! - [`uart::UartIrq`], [`uart::UartControl`] - Interrupt-driven serial port
//! - [`power::SleepControl`] - Idle and deep power-down entry
//! - [`DelayNs`] - Busy-wait delays (from `embedded-hal`)

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod power;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use embedded_hal::delay::DelayNs;
pub use gpio::{InputPin, OutputPin};
pub use power::{SleepControl, WakeSource};
pub use uart::{BaudMode, UartConfig, UartControl, UartIrq};
