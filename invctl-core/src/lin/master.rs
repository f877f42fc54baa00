use invctl_hal::{BaudMode, DelayNs, UartControl};
use invctl_protocol::{checksum, FrameId, LinFrame, BREAK_BYTE, SYNC_BYTE};

use crate::serial::SerialLink;

/// Wakeup: idle-high lead-in, low pulse, then time for the slave to power up
const WAKEUP_LEAD_MS: u32 = 10;
const WAKEUP_PULSE_MS: u32 = 1;
const WAKEUP_SETTLE_MS: u32 = 105;

/// 1ms polls allowed for the previous frame to leave before a break
const TX_DRAIN_POLLS: u8 = 100;

/// Polls for the first response byte, and their spacing
const FIRST_BYTE_POLLS: u8 = 5;
const FIRST_BYTE_POLL_MS: u32 = 2;

/// Pause between reads while draining a response
const DRAIN_PAUSE_MS: u32 = 1;

/// Upper bound on reads while draining
const DRAIN_LIMIT: usize = 32;

/// LIN bus master
pub struct LinMaster<'a, U, D> {
    link: SerialLink<'a, U, D>,
}

impl<'a, U: UartControl, D: DelayNs> LinMaster<'a, U, D> {
    pub fn new(link: SerialLink<'a, U, D>) -> Self {
        Self { link }
    }

    /// Pulse the bus low to wake sleeping slaves, then give them time to start
    pub fn wakeup(&mut self) {
        debug!("lin wakeup");
        self.link.drive_line(Some(true));
        self.link.delay_ms(WAKEUP_LEAD_MS);
        self.link.drive_line(Some(false));
        self.link.delay_ms(WAKEUP_PULSE_MS);
        self.link.drive_line(Some(true));
        self.link.delay_ms(WAKEUP_SETTLE_MS);
        self.link.drive_line(None);
    }

    /// Send break, sync and protected identifier; returns the protected ID
    pub fn send_header(&mut self, id: FrameId) -> u8 {
        // The baud switch must not hit a byte still in flight
        for _ in 0..TX_DRAIN_POLLS {
            if !self.link.tx_busy() {
                break;
            }
            self.link.delay_ms(1);
        }

        self.link.set_baud(BaudMode::Break);
        self.link.send(BREAK_BYTE);
        self.link.set_baud(BaudMode::Normal);

        let pid = id.protected();
        self.link.send(SYNC_BYTE);
        self.link.send(pid);
        pid
    }

    /// Send master data followed by its enhanced checksum
    pub fn send_data(&mut self, data: &[u8], protected_id: u8) {
        for &byte in data {
            self.link.send(byte);
        }
        self.link.send(checksum(protected_id, data));
    }

    /// Collect a slave response into `dest`
    ///
    /// Gives up with 0 when nothing arrives within the first-byte window.
    /// Otherwise reads until the receive ring runs dry, keeping at most
    /// `dest.len()` bytes, and returns how many were kept.
    pub fn read_response(&mut self, dest: &mut [u8]) -> usize {
        let mut arrived = false;
        for _ in 0..FIRST_BYTE_POLLS {
            self.link.delay_ms(FIRST_BYTE_POLL_MS);
            if self.link.rx_pending() > 0 {
                arrived = true;
                break;
            }
        }
        if !arrived {
            trace!("lin response timeout");
            return 0;
        }

        let mut kept = 0;
        for _ in 0..DRAIN_LIMIT {
            if self.link.rx_pending() == 0 {
                break;
            }
            if let Some(byte) = self.link.try_read() {
                if let Some(slot) = dest.get_mut(kept) {
                    *slot = byte;
                    kept += 1;
                }
            }
            self.link.delay_ms(DRAIN_PAUSE_MS);
        }
        kept
    }

    /// Transmit a complete master frame
    pub fn command(&mut self, frame: &LinFrame) {
        let pid = self.send_header(frame.id);
        self.send_data(&frame.data, pid);
    }

    /// Send a header and collect the slave's response
    pub fn request(&mut self, id: FrameId, dest: &mut [u8]) -> usize {
        self.send_header(id);
        self.read_response(dest)
    }

    pub fn set_rx_interrupt(&mut self, enabled: bool) {
        self.link.set_rx_interrupt(enabled);
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.link.delay_ms(ms);
    }
}
