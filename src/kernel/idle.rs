//! Tickless idle
//!
//! [`SleepController`] runs in the idle path each time the scheduler finds
//! nothing to do. It suppresses the tick, puts the core into low-power
//! retention with the low-power timer armed for the expected idle time, and
//! on wake steps the scheduler's tick count by the whole Tick Periods that
//! elapsed.
//!
//! ```text
//! Running -> PreparingSleep -> Sleeping -> Reconciling -> Running
//!                 |                                         ^
//!                 +------------------ Abort ----------------+
//! ```
//!
//! Everything from reading the expected idle time to the tick step runs
//! inside one critical section. The only time interrupts are let through is
//! the short window right after wake, so the compare-match handler can record
//! whether the deadline was reached.

use crate::kernel::classify::classify;
use crate::config::CFG_EXPECTED_IDLE_TIME_BEFORE_SLEEP;
use crate::critical::{is_isr_context, CriticalSection};
use crate::lptim::{LowPowerTimer, TickTimer};
use crate::port::PowerPlatform;
use crate::reconcile::{reconcile, Rearm};
use crate::sched::SchedulerTick;
use crate::time::TickState;
use crate::types::{IdlePhase, OsTick, SleepStrategy};

/// Result of one idle cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepOutcome {
    /// Strategy the classifier chose
    pub strategy: SleepStrategy,
    /// Expected idle time after clamping to the timer span
    pub requested: OsTick,
    /// Tick Periods stepped into the scheduler
    pub complete: OsTick,
    /// The timer deadline, not another interrupt, ended the sleep
    pub woke_on_timer: bool,
}

/// Idle path counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepStats {
    pub cycles: u32,
    pub aborted: u32,
    pub unbounded: u32,
    pub timer_wakes: u32,
    pub other_wakes: u32,
    pub ticks_stepped: u32,
}

impl SleepStats {
    pub const fn new() -> Self {
        Self {
            cycles: 0,
            aborted: 0,
            unbounded: 0,
            timer_wakes: 0,
            other_wakes: 0,
            ticks_stepped: 0,
        }
    }

    fn record(&mut self, outcome: &SleepOutcome) {
        self.cycles = self.cycles.wrapping_add(1);
        match outcome.strategy {
            SleepStrategy::Abort => self.aborted = self.aborted.wrapping_add(1),
            SleepStrategy::Unbounded => self.unbounded = self.unbounded.wrapping_add(1),
            SleepStrategy::Bounded(_) if outcome.woke_on_timer => {
                self.timer_wakes = self.timer_wakes.wrapping_add(1)
            }
            SleepStrategy::Bounded(_) => self.other_wakes = self.other_wakes.wrapping_add(1),
        }
        self.ticks_stepped = self.ticks_stepped.wrapping_add(outcome.complete);
    }
}

/// Tick suppression and low-power sleep
pub struct SleepController<'a, T, S, P> {
    state: &'a TickState,
    timer: TickTimer<T>,
    sched: S,
    platform: P,
    phase: IdlePhase,
    stats: SleepStats,
}

impl<'a, T, S, P> SleepController<'a, T, S, P>
where
    T: LowPowerTimer,
    S: SchedulerTick,
    P: PowerPlatform,
{
    pub fn new(state: &'a TickState, timer: TickTimer<T>, sched: S, platform: P) -> Self {
        Self {
            state,
            timer,
            sched,
            platform,
            phase: IdlePhase::Running,
            stats: SleepStats::default(),
        }
    }

    /// Carry counters over from an earlier controller
    pub fn with_stats(mut self, stats: SleepStats) -> Self {
        self.stats = stats;
        self
    }

    /// Tick source state shared with the compare-match handler
    #[inline(always)]
    pub fn state(&self) -> &'a TickState {
        self.state
    }

    #[inline(always)]
    pub fn phase(&self) -> IdlePhase {
        self.phase
    }

    #[inline(always)]
    pub fn stats(&self) -> SleepStats {
        self.stats
    }

    #[inline(always)]
    pub fn timer(&self) -> &TickTimer<T> {
        &self.timer
    }

    #[inline(always)]
    pub fn timer_mut(&mut self) -> &mut TickTimer<T> {
        &mut self.timer
    }

    #[inline(always)]
    pub fn scheduler(&self) -> &S {
        &self.sched
    }

    #[inline(always)]
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.sched
    }

    #[inline(always)]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[inline(always)]
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Start the one-Tick-Period cadence that replaces the periodic tick.
    ///
    /// Call once when the scheduler starts.
    pub fn start(&mut self) {
        let cs = CriticalSection::enter();

        self.timer.freeze_in_debug();
        self.timer.clear_pending();
        self.state.start_periodic(&cs);
        self.timer.arm_one_tick();

        crate::info!(
            "tick source started: {} timer ticks per tick, max idle {} ticks",
            self.timer.config().ticks_per_tick(),
            self.timer.config().max_suppressible_ticks()
        );
    }

    /// Idle hook: sleep if the scheduler expects to stay idle long enough
    pub fn idle(&mut self) -> Option<SleepOutcome> {
        let cs = CriticalSection::enter();
        let expected_idle = self.sched.expected_idle_ticks();
        if expected_idle < CFG_EXPECTED_IDLE_TIME_BEFORE_SLEEP {
            return None;
        }
        Some(self.sleep_masked(cs, expected_idle))
    }

    /// Suppress the tick and sleep for up to `expected_idle` Tick Periods
    pub fn suppress_ticks_and_sleep(&mut self, expected_idle: OsTick) -> SleepOutcome {
        let cs = CriticalSection::enter();
        self.sleep_masked(cs, expected_idle)
    }

    fn sleep_masked(&mut self, cs: CriticalSection, expected_idle: OsTick) -> SleepOutcome {
        debug_assert!(!is_isr_context());

        self.set_phase(IdlePhase::PreparingSleep);

        // A tick or a deadline change may have landed since the caller read it
        let expected_idle = expected_idle.min(self.sched.expected_idle_ticks());
        let requested = self.timer.config().clamp_idle(expected_idle);

        let strategy = classify(self.sched.query_sleep_readiness(), requested);

        let (complete, woke_on_timer) = match strategy {
            SleepStrategy::Abort => {
                self.timer.arm_one_tick();
                (0, false)
            }
            SleepStrategy::Unbounded => {
                self.sleep_unbounded(&cs);
                (0, false)
            }
            SleepStrategy::Bounded(idle) => self.sleep_bounded(&cs, idle),
        };

        self.sched.advance_tick_count(complete);
        self.set_phase(IdlePhase::Running);
        drop(cs);

        let outcome = SleepOutcome {
            strategy,
            requested,
            complete,
            woke_on_timer,
        };
        self.stats.record(&outcome);

        crate::debug!(
            "idle: {} requested {} stepped {} timer wake {}",
            outcome.strategy,
            outcome.requested,
            outcome.complete,
            outcome.woke_on_timer
        );

        outcome
    }

    /// No deadline: sleep until any interrupt, time is not tracked
    fn sleep_unbounded(&mut self, cs: &CriticalSection) {
        self.sched.suspend_periodic_tick();
        self.timer.disarm();
        self.timer.clear_pending();

        self.set_phase(IdlePhase::Sleeping);
        self.platform.pre_sleep(0);
        self.platform.enter_low_power_retention(true);
        self.platform.restore_clock_configuration();
        self.platform.post_sleep(0);
        cs.unmask_pending();

        self.set_phase(IdlePhase::Reconciling);
        self.timer.arm_one_tick();
        self.sched.resume_periodic_tick();
    }

    /// Sleep with the timer armed for `idle` Tick Periods.
    ///
    /// Returns the Tick Periods to step and whether the deadline fired.
    fn sleep_bounded(&mut self, cs: &CriticalSection, idle: OsTick) -> (OsTick, bool) {
        self.sched.suspend_periodic_tick();
        self.timer.disarm();
        // Flag cleared before arming, or a match could go unseen
        self.state.enter_sleep_window(cs);
        self.timer.clear_pending();
        let armed = self.timer.arm_periods(idle);

        self.set_phase(IdlePhase::Sleeping);
        self.platform.pre_sleep(idle);
        self.platform.enter_low_power_retention(true);
        self.platform.restore_clock_configuration();
        self.platform.post_sleep(idle);
        cs.unmask_pending();

        self.set_phase(IdlePhase::Reconciling);
        let fired = self.state.leave_sleep_window(cs);
        let result = reconcile(self.timer.config(), idle, fired, armed);

        match result.rearm {
            Rearm::OneTick => self.timer.arm_one_tick(),
            Rearm::Remaining(periods) => {
                self.timer.arm_periods(periods);
            }
        }
        self.sched.resume_periodic_tick();

        (result.complete, fired)
    }

    #[inline(always)]
    fn set_phase(&mut self, phase: IdlePhase) {
        crate::trace!("idle phase {}", phase);
        self.phase = phase;
    }
}
