//! Pin map of the STM32F042K6 auxiliary controller board
//!
//! | signal        | pin  | notes                             |
//! |---------------|------|-----------------------------------|
//! | plug detect   | PA0  | active low, EXTI0 falling edge    |
//! | aux rail      | PA1  | high while the 5V rail is present |
//! | LIN TX        | PA2  | USART2, driven as GPIO for wakeup |
//! | LIN RX        | PA3  | USART2                            |
//! | power cut     | PA4  | active high                       |
//! | indicator LED | PA5  | active high                       |
//! | power good    | PA6  | high while the battery is healthy |

use defmt::*;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::pac;
use embassy_stm32::usart::{self, Uart};
use embassy_stm32::Peripherals;
use invctl_hal::UartConfig;
use invctl_hal_stm32f0::{LinUsart, Stm32Input, Stm32Output};

/// EXTI line of the plug-detect input (PA0)
pub const PLUG_EXTI_LINE: usize = 0;

/// Pin number of LIN TX within GPIOA
const LIN_TX_PIN: usize = 2;

pub struct Board {
    pub uart: LinUsart,
    pub plug: Stm32Input<'static>,
    pub aux_rail: Stm32Input<'static>,
    pub power_good: Stm32Input<'static>,
    pub power_cut: Stm32Output<'static>,
    pub led: Stm32Output<'static>,
}

impl Board {
    pub fn new(p: Peripherals, uart_config: &UartConfig) -> Self {
        // Outputs start low so the controller's rail is never cut at reset
        let power_cut = Output::new(p.PA4, Level::Low, Speed::Low);
        let led = Output::new(p.PA5, Level::Low, Speed::Low);

        let mut config = usart::Config::default();
        config.baudrate = uart_config.baudrate;
        match Uart::new_blocking(p.USART2, p.PA3, p.PA2, config) {
            // Keep the peripheral configured; it is driven through its
            // registers from here on
            Ok(uart) => core::mem::forget(uart),
            Err(_) => panic!("USART2 rejected {} baud", uart_config.baudrate),
        }
        let uart = LinUsart::new(pac::USART2, pac::GPIOA, LIN_TX_PIN, uart_config);

        let plug = Input::new(p.PA0, Pull::Up);
        // PA0 is routed to EXTI0 by the SYSCFG reset value
        pac::EXTI
            .ftsr(0)
            .modify(|w| w.set_line(PLUG_EXTI_LINE, true));
        pac::EXTI
            .imr(0)
            .modify(|w| w.set_line(PLUG_EXTI_LINE, true));

        Self {
            uart,
            plug: Stm32Input::new(plug),
            aux_rail: Stm32Input::new(Input::new(p.PA1, Pull::None)),
            power_good: Stm32Input::new(Input::new(p.PA6, Pull::None)),
            power_cut: Stm32Output::new(power_cut),
            led: Stm32Output::new(led),
        }
    }
}

/// Acknowledge a plug-detect edge
pub fn clear_plug_edge() {
    pac::EXTI
        .pr(0)
        .write(|w| w.set_line(PLUG_EXTI_LINE, true));
}
