//! Error codes reported on the indicator LED
//!
//! Each code is blinked as three pulses, most significant bit first:
//! a long pulse for a 1 bit, a short pulse for a 0 bit.

/// Failure classes surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// Controller's auxiliary rail never appeared after wakeup pulses
    Wakeup,
    /// No status response during any start round
    Response,
    /// Start rounds exhausted without a more specific cause
    Startup,
    /// Controller acknowledged start but never reported power-good
    PowerGood,
    /// Battery power-good input reported undervoltage
    LowBattery,
}

/// One indicator pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pulse {
    Short,
    Long,
}

impl Pulse {
    /// Time the indicator stays on for this pulse
    pub fn on_ms(self) -> u32 {
        match self {
            Pulse::Short => 250,
            Pulse::Long => 500,
        }
    }
}

impl ErrorCode {
    /// Numeric code (1..=5)
    pub fn code(self) -> u8 {
        match self {
            ErrorCode::Wakeup => 1,
            ErrorCode::Response => 2,
            ErrorCode::Startup => 3,
            ErrorCode::PowerGood => 4,
            ErrorCode::LowBattery => 5,
        }
    }

    /// The three pulses for this code, most significant bit first
    pub fn blink_pattern(self) -> [Pulse; 3] {
        let code = self.code();
        let pulse = |bit: u8| {
            if code & (1 << bit) != 0 {
                Pulse::Long
            } else {
                Pulse::Short
            }
        };
        [pulse(2), pulse(1), pulse(0)]
    }
}
