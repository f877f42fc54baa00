//! Simulated board for host tests
//!
//! One shared [`World`] holds simulated time, the UART wire, the discrete
//! signals, and a model of the inverter controller on the far end of the
//! bus. The HAL trait implementations here all read and write that world.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use invctl_hal::{
    BaudMode, DelayNs, InputPin, OutputPin, SleepControl, UartControl, UartIrq, WakeSource,
};
use invctl_protocol::{
    checksum, FrameId, InverterCommand, BREAK_BYTE, COMMAND_FRAME, STATUS_FRAME, SYNC_BYTE,
};

use crate::control::{ControlConfig, ControlLoop};
use crate::indicator::ErrorReporter;
use crate::lin::LinMaster;
use crate::serial::{SerialLink, SharedSerial};
use crate::supervisor::{PowerSupervisor, SupervisorConfig};

/// Received bytes delivered per simulated millisecond (19200 baud)
const RX_BYTES_PER_MS: usize = 2;

/// Inverter controller model
#[derive(Debug)]
pub struct Peer {
    pub rail_on: bool,
    pub wakes_on_pulse: bool,
    pub responds: bool,
    pub acks_start: bool,
    pub power_good: bool,
    pub power_units: u8,
    /// Per-request power readings, used before falling back to `power_units`
    pub units_script: VecDeque<u8>,
    pub marker_valid: bool,
    pub stop_confirms: bool,
    pub cut_drops_rail: bool,
    pub operating: bool,
    pub commands: Vec<InverterCommand>,
    pub wakeups: usize,
    pub status_requests: usize,
}

impl Default for Peer {
    fn default() -> Self {
        Self {
            rail_on: true,
            wakes_on_pulse: true,
            responds: true,
            acks_start: true,
            power_good: true,
            power_units: 0,
            units_script: VecDeque::new(),
            marker_valid: true,
            stop_confirms: true,
            cut_drops_rail: true,
            operating: false,
            commands: Vec::new(),
            wakeups: 0,
            status_requests: 0,
        }
    }
}

impl Peer {
    fn status_bytes(&mut self) -> [u8; 9] {
        let units = self.units_script.pop_front().unwrap_or(self.power_units);
        let mut flags = 0;
        if self.operating {
            flags |= 0x01;
            if self.power_good {
                flags |= 0x02;
            }
        }
        let marker = if self.marker_valid { 0xFF } else { 0x00 };
        let mut bytes = [units, flags, 0x00, marker, 0, 0, 0, 0, 0];
        bytes[8] = checksum(STATUS_FRAME.protected(), &bytes[..8]);
        bytes
    }

    fn apply(&mut self, command: InverterCommand) {
        self.commands.push(command);
        match command {
            InverterCommand::Start if self.acks_start => self.operating = true,
            InverterCommand::Stop if self.stop_confirms => self.operating = false,
            _ => {}
        }
    }
}

/// Where the peer's frame decoder is
#[derive(Debug, Default)]
enum Decoder {
    #[default]
    Idle,
    Sync,
    Pid,
    Data(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Plug,
    AuxRail,
    PowerGood,
    PowerCut,
    Led,
}

#[derive(Debug)]
pub struct World {
    pub now_ms: u64,
    /// Every byte the UART transmitted, with the rate it went out at
    pub wire: Vec<(u8, BaudMode)>,
    /// TX line takeovers: (time, level)
    pub line: Vec<(u64, Option<bool>)>,
    pub pending_rx: VecDeque<u8>,
    rx_ready: Option<u8>,
    pub rx_irq_enabled: bool,
    tx_enabled: bool,
    baud: BaudMode,
    decoder: Decoder,
    pub plugged: bool,
    pub unplug_at: Option<u64>,
    pub plug_at: Option<u64>,
    pub plug_after_wake: bool,
    /// Plug edges are being latched for the next sleep
    wake_armed: bool,
    wake_latched: bool,
    pub sleeps: usize,
    pub rx_irq_at_sleep: Vec<bool>,
    pub power_good_script: VecDeque<bool>,
    pub power_good_default: bool,
    pub led: Vec<(u64, bool)>,
    pub cut_pulses: usize,
    pub rail_off_at: Option<u64>,
    pub peer: Peer,
}

impl Default for World {
    fn default() -> Self {
        Self {
            now_ms: 0,
            wire: Vec::new(),
            line: Vec::new(),
            pending_rx: VecDeque::new(),
            rx_ready: None,
            rx_irq_enabled: true,
            tx_enabled: false,
            baud: BaudMode::Normal,
            decoder: Decoder::Idle,
            plugged: false,
            unplug_at: None,
            plug_at: None,
            plug_after_wake: false,
            wake_armed: false,
            wake_latched: false,
            sleeps: 0,
            rx_irq_at_sleep: Vec::new(),
            power_good_script: VecDeque::new(),
            power_good_default: true,
            led: Vec::new(),
            cut_pulses: 0,
            rail_off_at: None,
            peer: Peer::default(),
        }
    }
}

impl World {
    fn transmit(&mut self, byte: u8) {
        self.wire.push((byte, self.baud));

        if self.baud == BaudMode::Break {
            if byte == BREAK_BYTE {
                self.decoder = Decoder::Sync;
            }
            return;
        }

        self.decoder = match core::mem::take(&mut self.decoder) {
            Decoder::Sync if byte == SYNC_BYTE => Decoder::Pid,
            Decoder::Pid => match FrameId::from_protected(byte) {
                Ok(id) if id == STATUS_FRAME => {
                    self.status_requested();
                    Decoder::Idle
                }
                Ok(id) if id == COMMAND_FRAME => Decoder::Data(Vec::new()),
                _ => Decoder::Idle,
            },
            Decoder::Data(mut data) => {
                data.push(byte);
                if data.len() < 3 {
                    Decoder::Data(data)
                } else {
                    if checksum(COMMAND_FRAME.protected(), &data[..2]) == data[2] {
                        if let Some(command) = InverterCommand::from_payload(&data[..2]) {
                            self.peer.apply(command);
                        }
                    }
                    Decoder::Idle
                }
            }
            _ => Decoder::Idle,
        };
    }

    fn status_requested(&mut self) {
        if !self.peer.rail_on || !self.peer.responds {
            return;
        }
        self.peer.status_requests += 1;
        let bytes = self.peer.status_bytes();
        self.pending_rx.extend(bytes);
    }

    fn tick(&mut self) {
        self.now_ms += 1;
        if self.unplug_at.is_some_and(|at| self.now_ms >= at) {
            self.plugged = false;
            self.unplug_at = None;
        }
        if self.plug_at.is_some_and(|at| self.now_ms >= at) {
            self.plugged = true;
            self.plug_at = None;
            if self.wake_armed {
                self.wake_latched = true;
            }
        }
        if self.rail_off_at.is_some_and(|at| self.now_ms >= at) {
            self.peer.rail_on = false;
            self.peer.operating = false;
            self.rail_off_at = None;
        }
    }

    fn set_line(&mut self, level: Option<bool>) {
        let was_high = self.line.last().is_some_and(|&(_, l)| l == Some(true));
        if was_high && level == Some(false) {
            self.peer.wakeups += 1;
            if self.peer.wakes_on_pulse {
                self.peer.rail_on = true;
            }
        }
        self.line.push((self.now_ms, level));
    }
}

/// Interrupt-context view of the simulated UART
struct SimIrq<'w> {
    world: &'w mut World,
}

impl UartIrq for SimIrq<'_> {
    fn take_rx(&mut self) -> Option<u8> {
        self.world.rx_ready.take()
    }

    fn take_tx_ready(&mut self) -> bool {
        self.world.tx_enabled
    }

    fn write_data(&mut self, byte: u8) {
        self.world.transmit(byte);
    }

    fn tx_idle(&mut self) {
        self.world.tx_enabled = false;
    }
}

pub type Handle = Rc<RefCell<World>>;

/// Main-context view of the simulated UART
///
/// Transmission completes synchronously: a kick runs the interrupt
/// handler until the transmit ring is empty.
pub struct SimUart<'a> {
    world: Handle,
    shared: &'a SharedSerial,
}

impl UartControl for SimUart<'_> {
    fn kick_tx(&mut self) {
        let mut world = self.world.borrow_mut();
        world.tx_enabled = true;
        let mut irq = SimIrq { world: &mut *world };
        while irq.world.tx_enabled {
            self.shared.on_interrupt(&mut irq);
        }
    }

    fn tx_complete(&self) -> bool {
        true
    }

    fn set_baud(&mut self, mode: BaudMode) {
        self.world.borrow_mut().baud = mode;
    }

    fn set_rx_interrupt(&mut self, enabled: bool) {
        self.world.borrow_mut().rx_irq_enabled = enabled;
    }

    fn drive_line(&mut self, level: Option<bool>) {
        self.world.borrow_mut().set_line(level);
    }
}

/// Delay that advances simulated time and feeds received bytes through
/// the interrupt handler as it goes
#[derive(Clone)]
pub struct SimDelay<'a> {
    world: Handle,
    shared: &'a SharedSerial,
}

impl SimDelay<'_> {
    fn advance_ms(&mut self, ms: u32) {
        let mut world = self.world.borrow_mut();
        for _ in 0..ms {
            world.tick();
            for _ in 0..RX_BYTES_PER_MS {
                if !world.rx_irq_enabled {
                    break;
                }
                let Some(byte) = world.pending_rx.pop_front() else {
                    break;
                };
                world.rx_ready = Some(byte);
                self.shared.on_interrupt(&mut SimIrq { world: &mut *world });
            }
        }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.advance_ms(ns / 1_000_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance_ms(us / 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_ms(ms);
    }
}

pub struct SimPin {
    world: Handle,
    signal: Signal,
    driven_high: bool,
}

impl InputPin for SimPin {
    fn is_high(&self) -> bool {
        let mut world = self.world.borrow_mut();
        match self.signal {
            // Active low
            Signal::Plug => !world.plugged,
            Signal::AuxRail => world.peer.rail_on,
            Signal::PowerGood => {
                let default = world.power_good_default;
                world.power_good_script.pop_front().unwrap_or(default)
            }
            Signal::PowerCut | Signal::Led => self.driven_high,
        }
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) {
        self.driven_high = true;
        let mut world = self.world.borrow_mut();
        match self.signal {
            Signal::Led => {
                let now = world.now_ms;
                world.led.push((now, true));
            }
            Signal::PowerCut => {
                world.cut_pulses += 1;
                if world.peer.cut_drops_rail {
                    world.peer.rail_on = false;
                    world.peer.operating = false;
                }
            }
            _ => {}
        }
    }

    fn set_low(&mut self) {
        let was_high = self.driven_high;
        self.driven_high = false;
        if self.signal == Signal::Led && was_high {
            let mut world = self.world.borrow_mut();
            let now = world.now_ms;
            world.led.push((now, false));
        }
    }

    fn is_set_high(&self) -> bool {
        self.driven_high
    }
}

pub struct SimSleep {
    world: Handle,
    /// Simulated time spent asleep
    sleep_ms: u64,
}

impl SleepControl for SimSleep {
    fn arm(&mut self, wake: WakeSource) {
        assert_eq!(wake, WakeSource::PlugEdge);
        let mut world = self.world.borrow_mut();
        world.wake_armed = true;
        world.wake_latched = false;
    }

    /// Sleeps a fixed time unless an edge was latched since arming
    fn sleep_until(&mut self, wake: WakeSource) {
        assert_eq!(wake, WakeSource::PlugEdge);
        let mut world = self.world.borrow_mut();
        assert!(world.wake_armed, "sleep entered without arming");
        world.sleeps += 1;
        let rx_enabled = world.rx_irq_enabled;
        world.rx_irq_at_sleep.push(rx_enabled);
        if !world.wake_latched {
            world.now_ms += self.sleep_ms;
            world.plugged = world.plug_after_wake;
        }
        world.wake_armed = false;
        world.wake_latched = false;
    }

    fn power_down(&mut self) -> ! {
        panic!("powered down at {} ms", self.world.borrow().now_ms);
    }
}

pub type SimSupervisor<'a> = PowerSupervisor<'a, SimUart<'a>, SimDelay<'a>, SimPin, SimPin>;
pub type SimControl<'a> = ControlLoop<'a, SimUart<'a>, SimDelay<'a>, SimPin, SimPin, SimSleep>;

/// Test fixture handing out HAL views of one world
pub struct Sim {
    world: Handle,
}

impl Sim {
    pub fn new() -> Self {
        Self {
            world: Rc::new(RefCell::new(World::default())),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.world.borrow_mut())
    }

    pub fn now(&self) -> u64 {
        self.world.borrow().now_ms
    }

    pub fn uart<'a>(&self, shared: &'a SharedSerial) -> SimUart<'a> {
        SimUart {
            world: self.world.clone(),
            shared,
        }
    }

    pub fn delay<'a>(&self, shared: &'a SharedSerial) -> SimDelay<'a> {
        SimDelay {
            world: self.world.clone(),
            shared,
        }
    }

    pub fn pin(&self, signal: Signal) -> SimPin {
        SimPin {
            world: self.world.clone(),
            signal,
            driven_high: false,
        }
    }

    pub fn sleep(&self) -> SimSleep {
        SimSleep {
            world: self.world.clone(),
            sleep_ms: 60_000,
        }
    }

    pub fn lin<'a>(&self, shared: &'a SharedSerial) -> LinMaster<'a, SimUart<'a>, SimDelay<'a>> {
        LinMaster::new(SerialLink::new(
            shared,
            self.uart(shared),
            self.delay(shared),
        ))
    }

    pub fn supervisor<'a>(&self, shared: &'a SharedSerial) -> SimSupervisor<'a> {
        self.supervisor_with(shared, SupervisorConfig::default())
    }

    pub fn supervisor_with<'a>(
        &self,
        shared: &'a SharedSerial,
        config: SupervisorConfig,
    ) -> SimSupervisor<'a> {
        PowerSupervisor::new(
            self.lin(shared),
            self.pin(Signal::AuxRail),
            self.pin(Signal::PowerGood),
            self.pin(Signal::PowerCut),
            self.delay(shared),
            config,
        )
    }

    pub fn control<'a>(&self, shared: &'a SharedSerial) -> SimControl<'a> {
        self.control_with(shared, ControlConfig::default())
    }

    /// Boot a control loop; time is reset to zero once boot completes
    pub fn control_with<'a>(
        &self,
        shared: &'a SharedSerial,
        config: ControlConfig,
    ) -> SimControl<'a> {
        let control = ControlLoop::boot(
            self.supervisor(shared),
            ErrorReporter::new(self.pin(Signal::Led), self.delay(shared)),
            self.pin(Signal::Plug),
            self.sleep(),
            self.delay(shared),
            config,
        );
        self.with(|w| w.now_ms = 0);
        control
    }
}
