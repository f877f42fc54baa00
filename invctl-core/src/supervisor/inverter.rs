//! Start and stop sequences

use invctl_hal::{DelayNs, InputPin, OutputPin, UartControl};
use invctl_protocol::InverterCommand;

use super::{AuxRail, PowerSupervisor};
use crate::error::ErrorCode;

impl<U, D, I, O> PowerSupervisor<'_, U, D, I, O>
where
    U: UartControl,
    D: DelayNs,
    I: InputPin,
    O: OutputPin,
{
    /// Enable the 230V output, or confirm it is still enabled
    ///
    /// Succeeds once a status response carries both the operating and the
    /// power-good flag. A failure is classified over all rounds: no response
    /// at all, acknowledged without power-good, or anything else.
    pub fn start_inverter(&mut self) -> Result<(), ErrorCode> {
        self.ensure_rail()?;

        let mut any_response = false;
        let mut acked_without_power_good = false;

        for round in 0..self.config.start_rounds {
            if round > 0 {
                self.delay.delay_ms(self.config.retry_backoff_ms);
            }
            self.lin.command(&InverterCommand::Start.frame());

            for _ in 0..self.config.status_polls {
                self.delay.delay_ms(self.config.status_poll_ms);
                let (count, status) = self.poll_status();
                if count > 0 {
                    any_response = true;
                }
                let Some(status) = status else {
                    continue;
                };
                if !status.is_operating() {
                    continue;
                }
                if !status.is_power_good() {
                    acked_without_power_good = true;
                    continue;
                }
                debug!("inverter running, round {=u8}", round);
                return Ok(());
            }
        }

        let error = if !any_response {
            ErrorCode::Response
        } else if acked_without_power_good {
            ErrorCode::PowerGood
        } else {
            ErrorCode::Startup
        };
        warn!("inverter start failed: {}", error);
        Err(error)
    }

    /// Disable the 230V output
    ///
    /// With `cut_power` the controller's supply is also pulsed off once it
    /// confirms the stop. Without a confirmation (or when the pulses do not
    /// take the rail down) the rail gets up to the configured wait to drop
    /// by itself.
    pub fn stop_inverter(&mut self, cut_power: bool) {
        if !self.rail_present() {
            return;
        }

        for attempt in 0..self.config.stop_attempts {
            self.lin.command(&InverterCommand::Stop.frame());

            let mut confirmed = false;
            for _ in 0..self.config.status_polls {
                self.delay.delay_ms(self.config.status_poll_ms);
                let (_, status) = self.poll_status();
                if !status.is_some_and(|status| status.confirms_stopped()) {
                    continue;
                }
                debug!("inverter stop confirmed, attempt {=u8}", attempt);
                if !cut_power || self.pulse_power_cut() {
                    return;
                }
                confirmed = true;
                break;
            }

            self.delay.delay_ms(self.config.retry_backoff_ms);
            if confirmed {
                break;
            }
        }

        for _ in 0..self.config.rail_drop_checks {
            self.delay.delay_ms(self.config.rail_drop_check_ms);
            if !self.rail_present() {
                return;
            }
        }
        warn!("aux rail still present after stop");
    }

    /// Check the rail, waking the controller when it is down
    fn ensure_rail(&mut self) -> Result<(), ErrorCode> {
        for _ in 0..self.config.wakeup_attempts {
            if self.rail_present() {
                return Ok(());
            }
            self.lin.wakeup();
        }
        warn!("aux rail did not come up");
        Err(ErrorCode::Wakeup)
    }

    /// Pulse the power-cut output until the rail drops; true if it did
    fn pulse_power_cut(&mut self) -> bool {
        for _ in 0..self.config.cut_pulses {
            self.power_cut.set_high();
            self.delay.delay_ms(self.config.cut_pulse_ms);
            self.power_cut.set_low();
            if !self.rail_present() {
                return true;
            }
        }
        false
    }
}
