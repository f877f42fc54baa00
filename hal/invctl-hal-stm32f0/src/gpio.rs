//! GPIO wrappers implementing the invctl pin traits

use embassy_stm32::gpio::{Input, Output};

/// Digital input backed by an embassy-stm32 pin
pub struct Stm32Input<'d> {
    pin: Input<'d>,
}

impl<'d> Stm32Input<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl invctl_hal::InputPin for Stm32Input<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

/// Digital output backed by an embassy-stm32 pin
pub struct Stm32Output<'d> {
    pin: Output<'d>,
}

impl<'d> Stm32Output<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl invctl_hal::OutputPin for Stm32Output<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
