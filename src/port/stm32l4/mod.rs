//! STM32L4 port
//!
//! LPTIM1, clocked from LSE, replaces SysTick as the RTOS tick so the core
//! can drop into STOP1 while idle. The timer runs in timeout mode with the
//! compare-match interrupt enabled; the `LPTIM1` vector below is its handler.

use core::cell::Cell;

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::{NVIC, SCB};
use critical_section::Mutex;
use stm32_metapac as pac;

use crate::config::{CFG_LPTIM_MAX_COUNT, CFG_LPTIM_PRESCALER, LPTIM_CONFIG};
use crate::idle::{SleepController, SleepOutcome, SleepStats};
use crate::lptim::{LowPowerTimer, TickTimer};
use crate::port::PowerPlatform;
use crate::sched::{TickKernel, KERNEL};
use crate::time::{on_compare_match, TickState};
use crate::types::{OsTick, TimerTicks};

/// LPTIM1 position in the STM32L4 vector table
const LPTIM1_IRQ: u16 = 65;

/// CFGR.PRESC encoding of the configured prescaler
const LPTIM_PRESC_BITS: u8 = presc_bits(CFG_LPTIM_PRESCALER);

const fn presc_bits(prescaler: u32) -> u8 {
    match prescaler {
        1 => 0,
        2 => 1,
        4 => 2,
        8 => 3,
        16 => 4,
        32 => 5,
        64 => 6,
        128 => 7,
        _ => panic!("LPTIM prescaler must be a power of two up to 128"),
    }
}

// ============ Shared State ============

/// Tick source state shared with the `LPTIM1` handler
pub static TICK_STATE: TickState = TickState::new();

/// Application clock-tree restore, run after every STOP1 exit
static CLOCK_RESTORE: Mutex<Cell<Option<fn()>>> = Mutex::new(Cell::new(None));

static SLEEP_STATS: Mutex<Cell<SleepStats>> = Mutex::new(Cell::new(SleepStats::new()));

#[derive(Clone, Copy)]
struct Lptim1Irq;

unsafe impl InterruptNumber for Lptim1Irq {
    fn number(self) -> u16 {
        LPTIM1_IRQ
    }
}

// ============ LPTIM1 ============

/// LPTIM1 in timeout mode
pub struct Lptim1;

impl Lptim1 {
    /// Prescaler and timeout mode. CFGR is only writable while disabled.
    fn configure() {
        let r = pac::LPTIM1;
        r.cr().write(|w| w.set_enable(false));
        r.cfgr().modify(|w| {
            w.set_presc(pac::lptim::vals::Presc::from_bits(LPTIM_PRESC_BITS));
            w.set_timout(true);
        });
    }
}

impl LowPowerTimer for Lptim1 {
    fn arm(&mut self, timeout: TimerTicks) {
        let r = pac::LPTIM1;

        // IER is only writable while disabled
        r.cr().write(|w| w.set_enable(false));
        r.ier().write(|w| w.set_cmpmie(true));
        r.cr().write(|w| w.set_enable(true));

        r.arr().write(|w| w.set_arr(CFG_LPTIM_MAX_COUNT as u16));
        r.cmp().write(|w| w.set_cmp(timeout as u16));
        r.cr().write(|w| {
            w.set_enable(true);
            w.set_cntstrt(true);
        });
    }

    fn disarm(&mut self) {
        let r = pac::LPTIM1;
        r.cr().write(|w| w.set_enable(false));
        r.ier().write(|w| w.set_cmpmie(false));
    }

    fn clear_pending(&mut self) {
        pac::LPTIM1.icr().write(|w| {
            w.set_cmpmcf(true);
            w.set_arrmcf(true);
        });
        NVIC::unpend(Lptim1Irq);
    }

    fn freeze_in_debug(&mut self) {
        pac::DBGMCU.apb1fzr1().modify(|w| w.set_dbg_lptim1_stop(true));
    }
}

// ============ STOP1 ============

/// STOP1 retention: SRAM and registers kept, LSE-clocked LPTIM1 keeps counting
pub struct Stop1;

impl PowerPlatform for Stop1 {
    fn enter_low_power_retention(&mut self, wake_on_interrupt: bool) {
        pac::PWR.cr1().modify(|w| w.set_lpms(pac::pwr::vals::Lpms::STOP1));

        let mut scb = unsafe { cortex_m::Peripherals::steal() }.SCB;
        scb.set_sleepdeep();
        cortex_m::asm::dsb();

        if wake_on_interrupt {
            cortex_m::asm::wfi();
        } else {
            cortex_m::asm::wfe();
        }

        scb.clear_sleepdeep();
    }

    fn restore_clock_configuration(&mut self) {
        let hook = critical_section::with(|cs| CLOCK_RESTORE.borrow(cs).get());
        if let Some(restore) = hook {
            restore();
        }
    }
}

// ============ Public API ============

fn controller() -> SleepController<'static, Lptim1, &'static TickKernel, Stop1> {
    let stats = critical_section::with(|cs| SLEEP_STATS.borrow(cs).get());
    SleepController::new(
        &TICK_STATE,
        TickTimer::new(Lptim1, LPTIM_CONFIG),
        &KERNEL,
        Stop1,
    )
    .with_stats(stats)
}

fn save_stats(stats: SleepStats) {
    critical_section::with(|cs| SLEEP_STATS.borrow(cs).set(stats));
}

/// Register the routine that rebuilds the clock tree after STOP1
pub fn set_clock_restore_hook(hook: fn()) {
    critical_section::with(|cs| CLOCK_RESTORE.borrow(cs).set(Some(hook)));
}

/// Start LPTIM1 as the tick source. Call when the scheduler starts.
pub fn setup_timer_interrupt() {
    Lptim1::configure();
    controller().start();
    unsafe { NVIC::unmask(Lptim1Irq) };
}

/// Suppress the tick and sleep in STOP1 for up to `expected_idle` ticks
pub fn suppress_ticks_and_sleep(expected_idle: OsTick) -> SleepOutcome {
    let mut idle = controller();
    let outcome = idle.suppress_ticks_and_sleep(expected_idle);
    save_stats(idle.stats());
    outcome
}

/// Idle task body: sleep when the expected idle time makes it worthwhile
pub fn idle_hook() {
    let mut idle = controller();
    if idle.idle().is_some() {
        save_stats(idle.stats());
    }
}

/// Counters accumulated by the idle path
pub fn sleep_stats() -> SleepStats {
    critical_section::with(|cs| SLEEP_STATS.borrow(cs).get())
}

// ============ Interrupt Vector ============

/// LPTIM1 interrupt handler
#[no_mangle]
pub extern "C" fn LPTIM1() {
    let r = pac::LPTIM1;
    let isr = r.isr().read();

    if isr.arrm() {
        r.icr().write(|w| w.set_arrmcf(true));
    }

    if isr.cmpm() {
        r.icr().write(|w| w.set_cmpmcf(true));

        let mut timer = TickTimer::new(Lptim1, LPTIM_CONFIG);
        if on_compare_match(&TICK_STATE, &mut timer, &mut &KERNEL) {
            SCB::set_pendsv();
        }
    }
}
