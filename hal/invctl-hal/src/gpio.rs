//! GPIO pin abstractions
//!
//! The controller only needs plain digital signals: a handful of inputs
//! (plug detect, rail present, battery power-good) and two outputs
//! (power-cut pulse and indicator LED). Polarity is handled by the caller,
//! so these traits always talk about the electrical level.

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}
