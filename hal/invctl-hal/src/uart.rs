//! UART serial port abstractions
//!
//! The serial port is split in two views because it is touched from two
//! execution contexts:
//!
//! - [`UartIrq`] is what the interrupt handler sees: receive/transmit ready
//!   flags and the data register.
//! - [`UartControl`] is what the main loop sees: kicking the transmitter,
//!   switching the baud rate for a LIN break, masking the receive interrupt,
//!   and taking the TX line over as a plain GPIO for the wakeup pulse.
//!
//! Neither view owns any buffering. The ring buffers shared between the two
//! contexts live in `invctl-core`.

/// Interrupt-context view of the UART
pub trait UartIrq {
    /// Take a received byte if the receiver has one ready
    ///
    /// Clears the receive-ready condition.
    fn take_rx(&mut self) -> Option<u8>;

    /// Check and acknowledge the transmit-ready condition
    ///
    /// Returns true when the transmitter can accept the next byte and the
    /// transmit interrupt is the reason the handler was entered.
    fn take_tx_ready(&mut self) -> bool;

    /// Load the next byte into the transmit data register
    fn write_data(&mut self, byte: u8);

    /// Nothing left to send; stop requesting transmit interrupts
    fn tx_idle(&mut self);
}

/// Baud rate selection for the LIN transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudMode {
    /// Frame rate (19200 baud)
    Normal,
    /// Half rate, so a 0x00 byte stretches into a LIN break
    Break,
}

/// Main-context view of the UART
pub trait UartControl {
    /// Force a transmit interrupt so the handler starts draining the
    /// transmit buffer
    fn kick_tx(&mut self);

    /// Check whether the last byte has fully left the shift register
    fn tx_complete(&self) -> bool;

    /// Switch between the frame rate and the break rate
    fn set_baud(&mut self, mode: BaudMode);

    /// Enable or disable the receive interrupt
    fn set_rx_interrupt(&mut self, enabled: bool);

    /// Drive the TX line directly (`Some(level)`) or hand it back to the
    /// UART (`None`)
    fn drive_line(&mut self, level: Option<bool>);
}

/// UART configuration for the LIN transceiver
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Frame baud rate in bits per second
    pub baudrate: u32,
    /// Divisor applied to the frame rate while sending a break
    pub break_divisor: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 19_200,
            break_divisor: 2,
        }
    }
}

impl UartConfig {
    /// Baud rate used while transmitting a break byte
    pub fn break_baudrate(&self) -> u32 {
        self.baudrate / self.break_divisor.max(1)
    }
}
