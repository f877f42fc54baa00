//! Register-level USART for the LIN transceiver
//!
//! embassy-stm32 sets up clocks, pins and the initial baud rate; after that
//! the port is driven directly. [`UsartIrq`] is used from the USART
//! interrupt, [`LinUsart`] from the main loop. CR1 is shared between the
//! two, so main-side read-modify-writes run in a critical section.

use embassy_stm32::pac::gpio::{vals, Gpio};
use embassy_stm32::pac::usart::{regs, Usart};
use invctl_hal::{BaudMode, UartConfig, UartControl, UartIrq};

/// Polls of the transmission-complete flag before a baud change goes ahead
const TC_WAIT_LIMIT: u32 = 10_000;

/// Main-context USART control
pub struct LinUsart {
    regs: Usart,
    tx_port: Gpio,
    tx_pin: usize,
    normal_brr: u32,
    break_brr: u32,
}

impl LinUsart {
    /// Take over a USART already configured for `config.baudrate`
    ///
    /// `tx_port`/`tx_pin` name the TX pin so the wakeup pulse can drive it
    /// as a plain output.
    pub fn new(regs: Usart, tx_port: Gpio, tx_pin: usize, config: &UartConfig) -> Self {
        let normal_brr = regs.brr().read().0;
        let break_brr = normal_brr * config.baudrate / config.break_baudrate().max(1);
        Self {
            regs,
            tx_port,
            tx_pin,
            normal_brr,
            break_brr,
        }
    }

    fn wait_tx_complete(&self) {
        for _ in 0..TC_WAIT_LIMIT {
            if self.regs.isr().read().tc() {
                return;
            }
        }
    }
}

impl UartControl for LinUsart {
    fn kick_tx(&mut self) {
        // TXE is already set, so this raises the interrupt immediately
        critical_section::with(|_| self.regs.cr1().modify(|w| w.set_txeie(true)));
    }

    fn tx_complete(&self) -> bool {
        self.regs.isr().read().tc()
    }

    fn set_baud(&mut self, mode: BaudMode) {
        let brr = match mode {
            BaudMode::Normal => self.normal_brr,
            BaudMode::Break => self.break_brr,
        };
        self.wait_tx_complete();
        // BRR is only writable with the USART disabled
        critical_section::with(|_| {
            self.regs.cr1().modify(|w| w.set_ue(false));
            self.regs.brr().write_value(regs::Brr(brr));
            self.regs.cr1().modify(|w| w.set_ue(true));
        });
    }

    fn set_rx_interrupt(&mut self, enabled: bool) {
        critical_section::with(|_| self.regs.cr1().modify(|w| w.set_rxneie(enabled)));
    }

    fn drive_line(&mut self, level: Option<bool>) {
        let pin = self.tx_pin;
        match level {
            Some(high) => {
                self.tx_port.bsrr().write(|w| {
                    if high {
                        w.set_bs(pin, true)
                    } else {
                        w.set_br(pin, true)
                    }
                });
                self.tx_port
                    .moder()
                    .modify(|w| w.set_moder(pin, vals::Moder::OUTPUT));
            }
            None => self
                .tx_port
                .moder()
                .modify(|w| w.set_moder(pin, vals::Moder::ALTERNATE)),
        }
    }
}

/// Interrupt-context USART access
pub struct UsartIrq {
    regs: Usart,
}

impl UsartIrq {
    pub fn new(regs: Usart) -> Self {
        Self { regs }
    }
}

impl UartIrq for UsartIrq {
    fn take_rx(&mut self) -> Option<u8> {
        let isr = self.regs.isr().read();
        if isr.ore() {
            self.regs.icr().write(|w| w.set_ore(true));
        }
        if isr.rxne() {
            // Reading RDR clears RXNE
            Some(self.regs.rdr().read().dr() as u8)
        } else {
            None
        }
    }

    fn take_tx_ready(&mut self) -> bool {
        self.regs.cr1().read().txeie() && self.regs.isr().read().txe()
    }

    fn write_data(&mut self, byte: u8) {
        self.regs.tdr().write(|w| w.set_dr(byte as u16));
    }

    fn tx_idle(&mut self) {
        self.regs.cr1().modify(|w| w.set_txeie(false));
    }
}
