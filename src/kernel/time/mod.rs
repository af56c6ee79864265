//! Tick source management
//!
//! The low-power timer stands in for the periodic tick interrupt. While the
//! system runs, every compare-match is one tick: the handler advances the
//! scheduler by exactly one Tick Period and re-arms the timer for the next.
//! While the idle path has the tick suppressed, a match only records that
//! the sleep deadline was reached; the sleep controller accounts for the
//! whole sleep in one step.

mod flag;

pub use flag::WakeFlag;

use portable_atomic::{AtomicU8, Ordering};

use crate::critical::CriticalSection;
use crate::lptim::{LowPowerTimer, TickTimer};
use crate::sched::SchedulerTick;
use crate::types::{MatchAction, TickMode};

/// State shared between the compare-match interrupt and the idle path
pub struct TickState {
    mode: AtomicU8,
    wake: WakeFlag,
}

impl TickState {
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(TickMode::Stopped as u8),
            wake: WakeFlag::new(),
        }
    }

    /// Current meaning of a compare-match
    #[inline(always)]
    pub fn mode(&self) -> TickMode {
        TickMode::from(self.mode.load(Ordering::Acquire))
    }

    /// Scheduler started: matches are periodic ticks from now on
    pub fn start_periodic(&self, _cs: &CriticalSection) {
        self.mode.store(TickMode::Periodic as u8, Ordering::Release);
    }

    /// Matches are ignored again
    pub fn stop(&self, _cs: &CriticalSection) {
        self.mode.store(TickMode::Stopped as u8, Ordering::Release);
    }

    /// Begin a bounded sleep: the next match marks the deadline.
    ///
    /// Clears the attribution flag, so this must run before the timer is
    /// armed for the sleep.
    pub fn enter_sleep_window(&self, cs: &CriticalSection) {
        self.wake.clear(cs);
        self.mode.store(TickMode::SleepDeadline as u8, Ordering::Release);
    }

    /// End a bounded sleep, returning whether the deadline match fired
    pub fn leave_sleep_window(&self, cs: &CriticalSection) -> bool {
        let fired = self.wake.is_set(cs);
        self.mode.store(TickMode::Periodic as u8, Ordering::Release);
        fired
    }

    /// Attribution flag, for inspection
    #[inline(always)]
    pub fn wake_flag(&self) -> &WakeFlag {
        &self.wake
    }

    /// Record a compare-match and decide what the handler has to do.
    /// Interrupt context only.
    pub fn on_compare_match(&self) -> MatchAction {
        match self.mode() {
            TickMode::Stopped => MatchAction::Ignore,
            TickMode::Periodic => {
                self.wake.set_from_isr();
                MatchAction::Tick
            }
            TickMode::SleepDeadline => {
                self.wake.set_from_isr();
                MatchAction::WakeRecorded
            }
        }
    }
}

impl Default for TickState {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare-match handler body.
///
/// Returns `true` when the scheduler asks for a context switch.
pub fn on_compare_match<T, S>(
    state: &TickState,
    timer: &mut TickTimer<T>,
    sched: &mut S,
) -> bool
where
    T: LowPowerTimer,
    S: SchedulerTick,
{
    match state.on_compare_match() {
        MatchAction::Ignore => false,
        MatchAction::WakeRecorded => false,
        MatchAction::Tick => {
            let switch = sched.tick_from_isr();
            timer.arm_one_tick();
            switch
        }
    }
}
