/// Where an iteration of the control loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Battery check failed; rechecking
    BatteryLow,
    /// Battery never recovered; only a reset leaves this
    PermanentShutdown,
    /// Nothing plugged in; slept until a plug edge
    Sleeping,
    /// Inverter started, load monitoring disabled
    RunningUnmonitored,
    /// Inverter started and its load was checked
    RunningMonitored,
    /// Start failed and was reported; backed off
    StartFailedBackoff,
}

/// Counters carried between control loop iterations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    /// No-load checks seen, decays slowly under load
    pub no_load_counter: u8,
    /// The previous load check saw a load
    pub prev_was_load: bool,
    /// Consecutive failed battery checks
    pub low_batt_counter: u8,
    /// Stop on no load as well as on unplug; latched at boot
    pub drawn_power_detect: bool,
}

impl ControlState {
    pub fn new(drawn_power_detect: bool) -> Self {
        Self {
            no_load_counter: 0,
            prev_was_load: false,
            low_batt_counter: 0,
            drawn_power_detect,
        }
    }

    /// Count a failed battery check; returns the new count
    pub fn record_low_battery(&mut self) -> u8 {
        self.low_batt_counter = self.low_batt_counter.saturating_add(1);
        self.low_batt_counter
    }

    pub fn record_power_good(&mut self) {
        self.low_batt_counter = 0;
    }

    /// Count a load check that found a load
    ///
    /// The no-load count only starts decaying on the second loaded check in
    /// a row, so one stray reading does not reset it.
    pub fn record_load(&mut self) {
        if self.no_load_counter > 0 {
            if self.prev_was_load {
                self.no_load_counter -= 1;
            } else {
                self.prev_was_load = true;
            }
        }
    }

    /// Count a load check that found nothing drawn
    ///
    /// `soft` checks advance the no-load count; a hard stop leaves it at its
    /// ceiling.
    pub fn record_no_load(&mut self, soft: bool) {
        if soft {
            self.no_load_counter = self.no_load_counter.saturating_add(1);
        }
        self.prev_was_load = false;
    }
}
