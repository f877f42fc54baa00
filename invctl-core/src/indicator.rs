//! Blink-coded error indicator

use invctl_hal::{DelayNs, OutputPin};

use crate::error::ErrorCode;
use crate::supervisor::AuxRail;

/// Dark time after each pulse
pub const PULSE_GAP_MS: u32 = 350;

/// Blinks error codes on the indicator LED
///
/// The LED is supplied from the controller's auxiliary rail, so the rail
/// is brought up first when it is down.
pub struct ErrorReporter<O, D> {
    led: O,
    delay: D,
}

impl<O: OutputPin, D: DelayNs> ErrorReporter<O, D> {
    pub fn new(led: O, delay: D) -> Self {
        Self { led, delay }
    }

    pub fn report(&mut self, code: ErrorCode, rail: &mut impl AuxRail) {
        info!("error {=u8}", code.code());
        if !rail.rail_present() {
            rail.wake();
        }
        for pulse in code.blink_pattern() {
            self.led.set_high();
            self.delay.delay_ms(pulse.on_ms());
            self.led.set_low();
            self.delay.delay_ms(PULSE_GAP_MS);
        }
    }

    /// Force the LED off
    pub fn clear(&mut self) {
        self.led.set_low();
    }
}
