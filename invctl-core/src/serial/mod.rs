//! Interrupt-driven serial transport
//!
//! The receive and transmit rings are shared with the UART interrupt
//! handler. Every main-context access runs inside a critical section that
//! covers exactly one ring operation.

pub mod link;
pub mod ring;

pub use link::{SerialLink, SerialState, SharedSerial, TX_FULL_SPIN_LIMIT};
pub use ring::{RingBuffer, SERIAL_BUFFER_SIZE};
