//! Power sequencing for the inverter controller
//!
//! The controller sits on the LIN bus behind an auxiliary 5V rail that it
//! powers itself once woken. Everything here is a bounded retry sequence
//! built from LIN requests, two discrete inputs, and the power-cut output.

mod inverter;

use invctl_hal::{DelayNs, InputPin, OutputPin, UartControl};
use invctl_protocol::{StatusResponse, MAX_RESPONSE_LEN, STATUS_FRAME};

use crate::lin::LinMaster;

/// Attempt budgets and delays for the supervisor sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SupervisorConfig {
    /// Rail checks (each followed by a wakeup) before giving up
    pub wakeup_attempts: u8,
    /// Start command rounds
    pub start_rounds: u8,
    /// Status polls after each start or stop command
    pub status_polls: u8,
    /// Delay before each of those polls (ms)
    pub status_poll_ms: u32,
    /// Pause between start rounds and between stop attempts (ms)
    pub retry_backoff_ms: u32,
    /// Stop command attempts
    pub stop_attempts: u8,
    /// Power-cut pulses after a confirmed stop
    pub cut_pulses: u8,
    /// Width of each power-cut pulse (ms)
    pub cut_pulse_ms: u32,
    /// Checks while waiting for the rail to drop on its own
    pub rail_drop_checks: u8,
    /// Spacing of those checks (ms)
    pub rail_drop_check_ms: u32,
    /// Battery power-good samples
    pub power_good_samples: u8,
    /// Not-good samples that fail the battery check
    pub power_good_fail_limit: u8,
    /// Spacing of battery samples (ms)
    pub power_good_sample_ms: u32,
    /// Status polls for load detection
    pub load_polls: u8,
    /// Loaded responses needed to report a load
    pub load_threshold: u8,
    /// Delay between a load poll header and reading its response (ms)
    pub load_poll_ms: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            wakeup_attempts: 3,
            start_rounds: 3,
            status_polls: 10,
            status_poll_ms: 100,
            retry_backoff_ms: 250,
            stop_attempts: 3,
            cut_pulses: 10,
            cut_pulse_ms: 100,
            rail_drop_checks: 10,
            rail_drop_check_ms: 1000,
            power_good_samples: 10,
            power_good_fail_limit: 5,
            power_good_sample_ms: 10,
            load_polls: 10,
            load_threshold: 5,
            load_poll_ms: 20,
        }
    }
}

/// The controller's auxiliary rail, as seen by anything that needs it powered
///
/// The indicator LED is supplied from this rail, so the error reporter
/// wakes the controller before blinking.
pub trait AuxRail {
    /// Rail is up
    fn rail_present(&self) -> bool;

    /// Wake the controller so it brings the rail up
    fn wake(&mut self);
}

/// Command sequences for the inverter controller
pub struct PowerSupervisor<'a, U, D, I, O> {
    lin: LinMaster<'a, U, D>,
    aux_rail: I,
    power_good: I,
    power_cut: O,
    delay: D,
    config: SupervisorConfig,
}

impl<'a, U, D, I, O> PowerSupervisor<'a, U, D, I, O>
where
    U: UartControl,
    D: DelayNs,
    I: InputPin,
    O: OutputPin,
{
    /// Create a supervisor
    ///
    /// `aux_rail` reads high while the controller's rail is present,
    /// `power_good` reads high while the battery is healthy, and
    /// `power_cut` is active high.
    pub fn new(
        lin: LinMaster<'a, U, D>,
        aux_rail: I,
        power_good: I,
        power_cut: O,
        delay: D,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            lin,
            aux_rail,
            power_good,
            power_cut,
            delay,
            config,
        }
    }

    pub fn lin_mut(&mut self) -> &mut LinMaster<'a, U, D> {
        &mut self.lin
    }

    /// Drive the power-cut output inactive
    pub fn release_power_cut(&mut self) {
        self.power_cut.set_low();
    }

    /// Sample the battery power-good input
    ///
    /// Fails as soon as the not-good count reaches the limit, so a clearly
    /// bad battery is detected before all samples are taken.
    pub fn is_power_good(&mut self) -> bool {
        let mut not_good = 0u8;
        for _ in 0..self.config.power_good_samples {
            if self.power_good.is_low() {
                not_good += 1;
                if not_good >= self.config.power_good_fail_limit {
                    debug!("battery not good after {=u8} low samples", not_good);
                    return false;
                }
            }
            self.delay.delay_ms(self.config.power_good_sample_ms);
        }
        true
    }

    /// Check whether the inverter output is loaded
    pub fn enough_power_drawn(&mut self) -> bool {
        let mut loaded = 0u8;
        for _ in 0..self.config.load_polls {
            self.lin.send_header(STATUS_FRAME);
            self.delay.delay_ms(self.config.load_poll_ms);
            let mut response = [0u8; MAX_RESPONSE_LEN];
            let count = self.lin.read_response(&mut response);

            let Some(status) = StatusResponse::from_bytes(&response[..count]) else {
                continue;
            };
            trace!("drawn power {=u16} W", status.drawn_power_w());
            if status.reports_load() {
                loaded += 1;
                if loaded >= self.config.load_threshold {
                    return true;
                }
            }
        }
        debug!("load seen in {=u8} polls", loaded);
        false
    }

    /// Request one status frame
    fn poll_status(&mut self) -> (usize, Option<StatusResponse>) {
        let mut response = [0u8; MAX_RESPONSE_LEN];
        let count = self.lin.request(STATUS_FRAME, &mut response);
        (count, StatusResponse::from_bytes(&response[..count]))
    }
}

impl<U, D, I, O> AuxRail for PowerSupervisor<'_, U, D, I, O>
where
    U: UartControl,
    D: DelayNs,
    I: InputPin,
    O: OutputPin,
{
    fn rail_present(&self) -> bool {
        self.aux_rail.is_high()
    }

    fn wake(&mut self) {
        self.lin.wakeup();
    }
}
