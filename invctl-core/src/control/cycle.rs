use invctl_hal::{DelayNs, InputPin, OutputPin, SleepControl, UartControl, WakeSource};

use super::{ControlConfig, ControlState, Phase};
use crate::error::ErrorCode;
use crate::indicator::ErrorReporter;
use crate::supervisor::{AuxRail, PowerSupervisor};

/// The supervisor's main loop
pub struct ControlLoop<'a, U, D, I, O, S> {
    supervisor: PowerSupervisor<'a, U, D, I, O>,
    reporter: ErrorReporter<O, D>,
    /// Plug detect, active low
    plug: I,
    sleep: S,
    delay: D,
    config: ControlConfig,
    state: ControlState,
}

impl<'a, U, D, I, O, S> ControlLoop<'a, U, D, I, O, S>
where
    U: UartControl,
    D: DelayNs,
    I: InputPin,
    O: OutputPin,
    S: SleepControl,
{
    /// Bring outputs to a safe state and latch the load detection mode
    ///
    /// Load detection is enabled when something is already plugged in at
    /// power-up. Leaves the serial receive interrupt enabled.
    pub fn boot(
        mut supervisor: PowerSupervisor<'a, U, D, I, O>,
        mut reporter: ErrorReporter<O, D>,
        plug: I,
        sleep: S,
        mut delay: D,
        config: ControlConfig,
    ) -> Self {
        reporter.clear();
        supervisor.release_power_cut();
        delay.delay_ms(config.boot_settle_ms);

        let mut control = Self {
            supervisor,
            reporter,
            plug,
            sleep,
            delay,
            config,
            state: ControlState::new(false),
        };
        control.state.drawn_power_detect = control.anything_plugged();
        control.supervisor.lin_mut().set_rx_interrupt(true);

        info!(
            "boot complete, load detection {=bool}",
            control.state.drawn_power_detect
        );
        control
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Run forever; a permanent shutdown powers the processor down
    pub fn run(&mut self) -> ! {
        loop {
            if self.step() == Phase::PermanentShutdown {
                self.sleep.power_down();
            }
        }
    }

    /// Run one iteration of the loop
    pub fn step(&mut self) -> Phase {
        if !self.supervisor.is_power_good() {
            return self.on_low_battery();
        }
        self.state.record_power_good();

        if !self.anything_plugged() {
            return self.sleep_until_plugged();
        }

        match self.supervisor.start_inverter() {
            Err(code) => {
                self.supervisor.stop_inverter(true);
                self.reporter.report(code, &mut self.supervisor);
                let slots = if code == ErrorCode::PowerGood {
                    self.config.power_good_backoff_slots
                } else {
                    self.config.start_backoff_slots
                };
                self.wait_if_plugged(slots);
                Phase::StartFailedBackoff
            }
            Ok(()) if self.state.drawn_power_detect => self.monitor_load(),
            Ok(()) => Phase::RunningUnmonitored,
        }
    }

    fn on_low_battery(&mut self) -> Phase {
        self.supervisor.stop_inverter(true);
        self.delay.delay_ms(self.config.low_battery_settle_ms);
        self.reporter.report(ErrorCode::LowBattery, &mut self.supervisor);

        let count = self.state.record_low_battery();
        if count >= self.config.low_battery_limit {
            error!("battery did not recover, shutting down");
            return Phase::PermanentShutdown;
        }
        warn!("low battery {=u8}/{=u8}", count, self.config.low_battery_limit);
        self.wait_if_plugged(self.config.low_battery_wait_slots);
        Phase::BatteryLow
    }

    fn sleep_until_plugged(&mut self) -> Phase {
        // A plug-in during the stop sequence must still end the sleep
        self.sleep.arm(WakeSource::PlugEdge);
        self.supervisor.stop_inverter(true);
        self.supervisor.lin_mut().set_rx_interrupt(false);
        debug!("sleeping until plugged");
        self.sleep.sleep_until(WakeSource::PlugEdge);
        self.supervisor.lin_mut().set_rx_interrupt(true);
        Phase::Sleeping
    }

    /// Stop the inverter when nothing draws power
    ///
    /// The first minutes after the load goes away use a soft stop and leave
    /// the controller's own timeout running; a keep-alive wakeup holds that
    /// timeout off once the no-load count is high enough. After that the
    /// controller is stopped and cut hard and rechecked rarely.
    fn monitor_load(&mut self) -> Phase {
        if !self.state.prev_was_load {
            // Skip the startup inrush
            self.delay.delay_ms(self.config.inrush_delay_ms);
        }

        if self.supervisor.enough_power_drawn() {
            self.state.record_load();
            return Phase::RunningMonitored;
        }

        if self.state.no_load_counter >= self.config.hard_stop_after {
            self.supervisor.stop_inverter(true);
            self.state.record_no_load(false);
            self.wait_if_plugged(self.config.hard_stop_wait_slots);
        } else {
            self.supervisor.stop_inverter(false);
            self.state.record_no_load(true);
            trace!("no load {=u8}", self.state.no_load_counter);
            self.wait_if_plugged(self.config.soft_stop_wait_slots);
            if self.state.no_load_counter >= self.config.keepalive_after {
                self.supervisor.wake();
                self.wait_if_plugged(self.config.keepalive_wait_slots);
            }
        }
        Phase::RunningMonitored
    }

    /// Plug detect must read asserted twice, one debounce interval apart
    fn anything_plugged(&mut self) -> bool {
        if self.plug.is_high() {
            return false;
        }
        self.delay.delay_ms(self.config.plug_debounce_ms);
        self.plug.is_low()
    }

    /// Wait up to `slots` slots, ending early when the load is unplugged
    fn wait_if_plugged(&mut self, slots: u8) {
        for _ in 0..slots {
            if !self.anything_plugged() {
                break;
            }
            self.delay.delay_ms(self.config.slot_ms);
        }
    }
}
