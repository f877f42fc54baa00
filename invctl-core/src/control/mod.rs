//! Top-level control loop
//!
//! Each iteration checks the battery, then either keeps the inverter running
//! while something is plugged in or shuts it down and sleeps until a plug
//! edge. Counters carried between iterations live in [`ControlState`].

mod cycle;
mod state;

pub use cycle::ControlLoop;
pub use state::{ControlState, Phase};

/// Thresholds and wait lengths for the control loop
///
/// Waits marked "slots" run in plug-aware slots of one debounce read plus
/// `slot_ms`, ending early when the load is unplugged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlConfig {
    /// Settle time after reset before the first plug read (ms)
    pub boot_settle_ms: u32,
    /// Spacing of the two plug-detect reads (ms)
    pub plug_debounce_ms: u32,
    /// Remainder of one wait slot after the debounce read (ms)
    pub slot_ms: u32,
    /// Pause between stopping for low battery and reporting it (ms)
    pub low_battery_settle_ms: u32,
    /// Consecutive low battery iterations before permanent shutdown
    pub low_battery_limit: u8,
    /// Recheck interval after a low battery report (slots)
    pub low_battery_wait_slots: u8,
    /// Backoff after a power-good start failure (slots)
    pub power_good_backoff_slots: u8,
    /// Backoff after any other start failure (slots)
    pub start_backoff_slots: u8,
    /// Extra delay before the first load check after a no-load period (ms)
    pub inrush_delay_ms: u32,
    /// No-load count at which the controller is stopped hard
    pub hard_stop_after: u8,
    /// Recheck interval once stopped hard (slots)
    pub hard_stop_wait_slots: u8,
    /// Recheck interval after a soft stop (slots)
    pub soft_stop_wait_slots: u8,
    /// No-load count from which every check also sends a keep-alive wakeup
    pub keepalive_after: u8,
    /// Extra wait after a keep-alive wakeup (slots)
    pub keepalive_wait_slots: u8,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            boot_settle_ms: 500,
            plug_debounce_ms: 20,
            slot_ms: 80,
            low_battery_settle_ms: 250,
            low_battery_limit: 5,
            low_battery_wait_slots: 30,
            power_good_backoff_slots: 150,
            start_backoff_slots: 15,
            inrush_delay_ms: 200,
            hard_stop_after: 60,
            hard_stop_wait_slots: 133,
            soft_stop_wait_slots: 18,
            keepalive_after: 20,
            keepalive_wait_slots: 30,
        }
    }
}
