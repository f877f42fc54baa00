//! invctl - Inverter Auxiliary Controller Firmware
//!
//! Supervises a 12V to 230V inverter controller over LIN on an
//! STM32F042K6. Runs a single blocking control loop; the USART and the
//! plug-detect edge are the only interrupts.

#![no_std]
#![no_main]

mod board;

use cortex_m_rt::entry;
use defmt::*;
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::InterruptExt;
use embassy_stm32::pac;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use invctl_core::control::{ControlConfig, ControlLoop};
use invctl_core::indicator::ErrorReporter;
use invctl_core::lin::LinMaster;
use invctl_core::serial::{SerialLink, SharedSerial};
use invctl_core::supervisor::{PowerSupervisor, SupervisorConfig};
use invctl_hal::UartConfig;
use invctl_hal_stm32f0::{signal_plug_edge, McuSleep, UsartIrq};

use crate::board::Board;

/// Rings shared with the USART interrupt
static SERIAL: SharedSerial = SharedSerial::new();

#[entry]
fn main() -> ! {
    info!("invctl starting");

    let p = embassy_stm32::init(Default::default());
    let Some(core) = cortex_m::Peripherals::take() else {
        panic!("core peripherals already taken");
    };

    let uart_config = UartConfig::default();
    let board = Board::new(p, &uart_config);

    // SAFETY: both handlers below only touch their own peripheral and
    // state guarded by critical sections
    unsafe {
        interrupt::USART2.enable();
        interrupt::EXTI0_1.enable();
    }

    let lin = LinMaster::new(SerialLink::new(&SERIAL, board.uart, Delay));
    let supervisor = PowerSupervisor::new(
        lin,
        board.aux_rail,
        board.power_good,
        board.power_cut,
        Delay,
        SupervisorConfig::default(),
    );
    let reporter = ErrorReporter::new(board.led, Delay);

    let mut control = ControlLoop::boot(
        supervisor,
        reporter,
        board.plug,
        McuSleep::new(core.SCB),
        Delay,
        ControlConfig::default(),
    );
    control.run()
}

#[interrupt]
fn USART2() {
    SERIAL.on_interrupt(&mut UsartIrq::new(pac::USART2));
}

#[interrupt]
fn EXTI0_1() {
    board::clear_plug_edge();
    signal_plug_edge();
}
