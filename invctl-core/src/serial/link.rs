//! Serial link over the shared rings

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use invctl_hal::{BaudMode, DelayNs, UartControl, UartIrq};

use super::ring::{RingBuffer, SERIAL_BUFFER_SIZE};

/// Spin iterations allowed while waiting for room in a full transmit ring
pub const TX_FULL_SPIN_LIMIT: u8 = 255;

/// Pause after each transmitted byte
const SEND_PACING_MS: u32 = 1;

/// State shared between the main loop and the UART interrupt
#[derive(Debug, Default)]
pub struct SerialState {
    pub rx: RingBuffer<SERIAL_BUFFER_SIZE>,
    pub tx: RingBuffer<SERIAL_BUFFER_SIZE>,
    /// The interrupt handler is draining `tx`
    pub tx_armed: bool,
}

impl SerialState {
    pub const fn new() -> Self {
        Self {
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            tx_armed: false,
        }
    }
}

/// Ring buffers guarded for access from both execution contexts
///
/// Meant to live in a `static` so the interrupt handler can reach it.
pub struct SharedSerial {
    state: Mutex<CriticalSectionRawMutex, RefCell<SerialState>>,
}

impl Default for SharedSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSerial {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(SerialState::new())),
        }
    }

    /// Run `f` with interrupts masked
    pub fn with<R>(&self, f: impl FnOnce(&mut SerialState) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// UART interrupt body
    ///
    /// A received byte is stored unless the receive ring is full. When the
    /// transmitter is ready the next pending byte goes out; with nothing
    /// left the transmitter is marked idle.
    pub fn on_interrupt(&self, irq: &mut impl UartIrq) {
        self.with(|state| {
            if let Some(byte) = irq.take_rx() {
                if !state.rx.enqueue(byte) {
                    trace!("rx ring full, dropped {=u8:#x}", byte);
                }
            }
            if irq.take_tx_ready() {
                match state.tx.dequeue() {
                    Some(byte) => irq.write_data(byte),
                    None => {
                        state.tx_armed = false;
                        irq.tx_idle();
                    }
                }
            }
        });
    }
}

/// Main-context side of the serial port
pub struct SerialLink<'a, U, D> {
    shared: &'a SharedSerial,
    uart: U,
    delay: D,
}

impl<'a, U: UartControl, D: DelayNs> SerialLink<'a, U, D> {
    pub fn new(shared: &'a SharedSerial, uart: U, delay: D) -> Self {
        Self {
            shared,
            uart,
            delay,
        }
    }

    /// Queue one byte for transmission and pace the caller
    ///
    /// An idle transmitter is kicked so the interrupt handler starts
    /// draining. When the ring is already full the byte is dropped after a
    /// bounded wait for the shift register to empty.
    pub fn send(&mut self, byte: u8) {
        let (kick, full) = self.shared.with(|state| {
            let queued = state.tx.enqueue(byte);
            if !queued {
                trace!("tx ring full, dropped {=u8:#x}", byte);
            }
            let kick = !state.tx_armed;
            if kick {
                state.tx_armed = true;
            }
            (kick, state.tx.is_full())
        });

        if kick {
            self.uart.kick_tx();
        } else if full {
            for _ in 0..TX_FULL_SPIN_LIMIT {
                if self.uart.tx_complete() {
                    break;
                }
            }
        }

        self.delay.delay_ms(SEND_PACING_MS);
    }

    /// Take the oldest received byte, if any
    pub fn try_read(&mut self) -> Option<u8> {
        self.shared.with(|state| state.rx.dequeue())
    }

    /// Number of received bytes waiting
    pub fn rx_pending(&self) -> usize {
        self.shared.with(|state| state.rx.len())
    }

    /// The interrupt handler still has bytes to push out
    pub fn tx_busy(&self) -> bool {
        self.shared.with(|state| state.tx_armed)
    }

    pub fn set_rx_interrupt(&mut self, enabled: bool) {
        self.uart.set_rx_interrupt(enabled);
    }

    pub fn set_baud(&mut self, mode: BaudMode) {
        self.uart.set_baud(mode);
    }

    /// Take over (`Some`) or release (`None`) the TX line
    pub fn drive_line(&mut self, level: Option<bool>) {
        self.uart.drive_line(level);
    }

    /// Busy-wait using the link's delay
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
