//! Board-agnostic core logic for the inverter auxiliary controller
//!
//! This crate contains everything that does not depend on a specific
//! microcontroller:
//!
//! - Interrupt-shared ring buffers and the serial link built on them
//! - LIN master (wakeup, header parity, checksum, response collection)
//! - Power sequencing for the inverter controller
//! - Blink-coded error reporting
//! - The top-level control loop and its hysteresis state
//!
//! Hardware is reached only through the traits in `invctl-hal`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod control;
pub mod error;
pub mod indicator;
pub mod lin;
pub mod serial;
pub mod supervisor;

#[cfg(test)]
mod sim;

pub use error::ErrorCode;
