//! Sleep entry for Cortex-M0

use cortex_m::peripheral::{NVIC, SCB};
use invctl_hal::{SleepControl, WakeSource};
use portable_atomic::{AtomicBool, Ordering};

static PLUG_EDGE: AtomicBool = AtomicBool::new(false);

/// Record a plug-detect edge; call from the EXTI interrupt
pub fn signal_plug_edge() {
    PLUG_EDGE.store(true, Ordering::Release);
}

/// WFI-based sleep control
pub struct McuSleep {
    scb: SCB,
}

impl McuSleep {
    pub fn new(scb: SCB) -> Self {
        Self { scb }
    }
}

impl SleepControl for McuSleep {
    fn arm(&mut self, wake: WakeSource) {
        match wake {
            WakeSource::PlugEdge => PLUG_EDGE.store(false, Ordering::Release),
        }
    }

    fn sleep_until(&mut self, wake: WakeSource) {
        match wake {
            WakeSource::PlugEdge => {
                self.scb.clear_sleepdeep();
                // Timer interrupts also end WFI; keep sleeping until the edge
                while !PLUG_EDGE.swap(false, Ordering::AcqRel) {
                    cortex_m::asm::wfi();
                }
            }
        }
    }

    fn power_down(&mut self) -> ! {
        cortex_m::interrupt::disable();
        // WFI ignores PRIMASK for wakeup; a pending enabled line would
        // return it at once
        mask_all_lines();
        self.scb.set_sleepdeep();
        loop {
            cortex_m::asm::wfi();
        }
    }
}

/// Disable and unpend every NVIC line (the M0 has at most 32)
#[allow(unsafe_code)]
fn mask_all_lines() {
    // SAFETY: runs with interrupts globally disabled, and nothing after it
    // needs an interrupt again
    unsafe {
        let nvic = &*NVIC::PTR;
        nvic.icer[0].write(u32::MAX);
        nvic.icpr[0].write(u32::MAX);
    }
}
