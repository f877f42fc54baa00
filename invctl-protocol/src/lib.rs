//! LIN protocol for the inverter controller
//!
//! The inverter's controller is a LIN slave. This firmware is the master
//! and uses exactly two frames:
//!
//! ```text
//! 0x3A  master → slave   command  [mode, 0x00]   mode 0x02 = start, 0x00 = stop
//! 0x3B  slave  → master  status   up to 8 data bytes + checksum
//! ```
//!
//! Every frame starts with a header sent by the master:
//! ```text
//! ┌───────┬──────┬──────────────┬─────────────┬──────────┐
//! │ BREAK │ SYNC │ PROTECTED ID │ DATA        │ CHECKSUM │
//! │ ≥13b  │ 0x55 │ id + parity  │ 0–8B        │ 1B       │
//! └───────┴──────┴──────────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is the LIN 2.x enhanced checksum, computed over the
//! protected ID and the data bytes.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{
    checksum, FrameError, FrameId, LinFrame, BREAK_BYTE, MAX_DATA_LEN, MAX_RESPONSE_LEN,
    SYNC_BYTE,
};
pub use messages::{InverterCommand, StatusResponse, COMMAND_FRAME, STATUS_FRAME};
