//! Processor sleep modes

/// Event that ends an idle sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeSource {
    /// Falling edge on the plug-detect input
    PlugEdge,
}

/// Low-power mode entry
pub trait SleepControl {
    /// Start latching `wake`
    ///
    /// An event that fires between this call and `sleep_until` is kept, so
    /// the following sleep returns at once.
    fn arm(&mut self, wake: WakeSource);

    /// Enter idle sleep and return once `wake` has fired since [`arm`]
    ///
    /// Other interrupts may still run while asleep.
    ///
    /// [`arm`]: SleepControl::arm
    fn sleep_until(&mut self, wake: WakeSource);

    /// Enter deep power-down with all interrupts disabled
    ///
    /// Only an external reset leaves this state.
    fn power_down(&mut self) -> !;
}
