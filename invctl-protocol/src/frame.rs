//! LIN frame construction.
//!
//! Frame format on the wire:
//! - BREAK: a 0x00 byte sent at half the frame baud rate
//! - SYNC (1 byte): 0x55
//! - PROTECTED ID (1 byte): 6-bit frame ID with two parity bits on top
//! - DATA (0-8 bytes): frame payload
//! - CHECKSUM (1 byte): enhanced checksum over PROTECTED ID and DATA

use heapless::Vec;

/// Byte transmitted at the break rate to produce a LIN break
pub const BREAK_BYTE: u8 = 0x00;

/// Synchronization byte following the break
pub const SYNC_BYTE: u8 = 0x55;

/// Largest frame identifier
pub const MAX_ID: u8 = 0x3F;

/// Maximum data bytes in a frame
pub const MAX_DATA_LEN: usize = 8;

/// Maximum bytes collected for a slave response (data + checksum)
pub const MAX_RESPONSE_LEN: usize = MAX_DATA_LEN + 1;

/// Errors that can occur while building or decoding frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Identifier does not fit in 6 bits
    InvalidId,
    /// Parity bits of a protected ID do not match its identifier
    InvalidParity,
    /// Payload exceeds the 8 byte LIN limit
    PayloadTooLarge,
}

/// 6-bit LIN frame identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameId(u8);

impl FrameId {
    /// Create a frame identifier, rejecting values above 0x3F
    pub const fn new(id: u8) -> Result<Self, FrameError> {
        if id > MAX_ID {
            Err(FrameError::InvalidId)
        } else {
            Ok(Self(id))
        }
    }

    /// Identifier for statically known frames; the value is masked to 6 bits
    pub(crate) const fn masked(id: u8) -> Self {
        Self(id & MAX_ID)
    }

    /// Raw 6-bit identifier
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Identifier with both parity bits packed on top
    ///
    /// `p0 = b0 ^ b1 ^ b2 ^ b4` goes to bit 6,
    /// `p1 = !(b1 ^ b3 ^ b4 ^ b5)` goes to bit 7.
    pub const fn protected(self) -> u8 {
        let id = self.0;
        let p0 = bit(id, 0) ^ bit(id, 1) ^ bit(id, 2) ^ bit(id, 4);
        let p1 = (bit(id, 1) ^ bit(id, 3) ^ bit(id, 4) ^ bit(id, 5)) ^ 0x01;
        (id & MAX_ID) | (p0 << 6) | (p1 << 7)
    }

    /// Recover the identifier from a protected ID, checking its parity
    pub const fn from_protected(pid: u8) -> Result<Self, FrameError> {
        let id = Self(pid & MAX_ID);
        if id.protected() == pid {
            Ok(id)
        } else {
            Err(FrameError::InvalidParity)
        }
    }
}

const fn bit(value: u8, n: u8) -> u8 {
    (value >> n) & 0x01
}

/// LIN enhanced checksum
///
/// Sums the protected ID and data into a 16-bit accumulator, folds the
/// carry byte back into the low byte once, and inverts the result.
pub fn checksum(protected_id: u8, data: &[u8]) -> u8 {
    let mut sum = protected_id as u16;
    for &byte in data {
        sum += byte as u16;
    }
    let folded = (sum & 0xFF) + (sum >> 8);
    !(folded as u8)
}

/// A master frame: identifier plus the data the master transmits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinFrame {
    /// Frame identifier
    pub id: FrameId,
    /// Data bytes
    pub data: Vec<u8, MAX_DATA_LEN>,
}

impl LinFrame {
    /// Create a frame with the given identifier and data
    pub fn new(id: FrameId, data: &[u8]) -> Result<Self, FrameError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(data)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { id, data: vec })
    }

}
