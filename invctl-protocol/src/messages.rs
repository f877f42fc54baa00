//! Inverter controller messages
//!
//! Commands go out on frame 0x3A, status comes back on frame 0x3B.

use crate::frame::{FrameId, LinFrame};

/// Master-to-slave command frame
pub const COMMAND_FRAME: FrameId = FrameId::masked(0x3A);

/// Slave-to-master status frame
pub const STATUS_FRAME: FrameId = FrameId::masked(0x3B);

/// Status byte1 bit0: controller acknowledged start and is operating
const STATUS_OPERATING: u8 = 0x01;

/// Status byte1 bit1: controller reports its output power is good
const STATUS_POWER_GOOD: u8 = 0x02;

/// Value of byte3 in a well-formed status response
const VALID_MARKER: u8 = 0xFF;

/// Watts per unit of the drawn-power field
pub const WATTS_PER_UNIT: u16 = 5;

/// Command sent on the command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InverterCommand {
    /// Enable the 230V output (or keep it enabled)
    Start,
    /// Disable the 230V output
    Stop,
}

impl InverterCommand {
    /// Mode byte for this command
    pub fn mode(self) -> u8 {
        match self {
            InverterCommand::Start => 0x02,
            InverterCommand::Stop => 0x00,
        }
    }

    /// Data bytes of the command frame
    pub fn payload(self) -> [u8; 2] {
        [self.mode(), 0x00]
    }

    /// Complete master frame for this command
    pub fn frame(self) -> LinFrame {
        LinFrame {
            id: COMMAND_FRAME,
            data: heapless::Vec::from_slice(&self.payload()).unwrap_or_default(),
        }
    }

    /// Decode a command from its data bytes
    pub fn from_payload(data: &[u8]) -> Option<Self> {
        match data {
            [0x02, 0x00] => Some(InverterCommand::Start),
            [0x00, 0x00] => Some(InverterCommand::Stop),
            _ => None,
        }
    }
}

/// Decoded status response
///
/// ```text
/// byte0   drawn power, 5W per unit
/// byte1   bit0 operating/acknowledged, bit1 power-good
/// byte3   0xFF when the response is well-formed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusResponse {
    /// Drawn power in 5W units
    pub power_units: u8,
    /// Raw status flags
    pub flags: u8,
    /// Byte3 was received and holds the validity marker
    pub marker_valid: bool,
}

impl StatusResponse {
    /// Minimum number of bytes needed to interpret a response
    pub const MIN_LEN: usize = 3;

    /// Decode a response from the bytes captured in one exchange
    ///
    /// Returns `None` when fewer than [`Self::MIN_LEN`] bytes arrived. The
    /// marker only counts when byte3 was part of this exchange.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            power_units: bytes[0],
            flags: bytes[1],
            marker_valid: bytes.get(3) == Some(&VALID_MARKER),
        })
    }

    /// Controller acknowledged the start command and is operating
    pub fn is_operating(&self) -> bool {
        self.flags & STATUS_OPERATING != 0
    }

    /// Controller reports power-good on its output stage
    pub fn is_power_good(&self) -> bool {
        self.flags & STATUS_POWER_GOOD != 0
    }

    /// Drawn power in watts
    pub fn drawn_power_w(&self) -> u16 {
        self.power_units as u16 * WATTS_PER_UNIT
    }

    /// Response is marked valid, acknowledged, and reports nonzero load
    pub fn reports_load(&self) -> bool {
        self.marker_valid && self.is_operating() && self.power_units > 0
    }

    /// Response is marked valid and the controller says it has stopped
    pub fn confirms_stopped(&self) -> bool {
        self.marker_valid && !self.is_operating()
    }
}
