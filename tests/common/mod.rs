//! Recording doubles for the timer, scheduler and power platform
//!
//! All three append to one shared event log so tests can check the order
//! in which the sleep controller touches them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tickless::config::{TimerConfig, LPTIM_CONFIG};
use tickless::critical::CriticalSection;
use tickless::time::TickState;
use tickless::types::{MatchAction, OsTick, SleepReadiness, TickMode, TimerTicks};
use tickless::{LowPowerTimer, PowerPlatform, SchedulerTick, SleepController, TickTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Arm { timeout: TimerTicks, flag_clear: bool },
    Disarm,
    ClearPending,
    FreezeInDebug,
    Query,
    Suspend,
    Resume,
    Advance(OsTick),
    PreSleep(OsTick),
    EnterLowPower(bool),
    RestoreClocks,
    PostSleep(OsTick),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn leak_state() -> &'static TickState {
    Box::leak(Box::new(TickState::new()))
}

/// Timeouts armed, in order
pub fn arms(log: &Log) -> Vec<TimerTicks> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Arm { timeout, .. } => Some(*timeout),
            _ => None,
        })
        .collect()
}

/// Values passed to `advance_tick_count`, in order
pub fn advances(log: &Log) -> Vec<OsTick> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Advance(n) => Some(*n),
            _ => None,
        })
        .collect()
}

pub fn position(log: &Log, pred: impl Fn(&Event) -> bool) -> Option<usize> {
    log.borrow().iter().position(pred)
}

pub fn count(log: &Log, pred: impl Fn(&Event) -> bool) -> usize {
    log.borrow().iter().filter(|&e| pred(e)).count()
}

// ============ Timer ============

pub struct MockTimer {
    log: Log,
    state: &'static TickState,
}

impl MockTimer {
    pub fn new(log: Log, state: &'static TickState) -> Self {
        Self { log, state }
    }
}

impl LowPowerTimer for MockTimer {
    fn arm(&mut self, timeout: TimerTicks) {
        let cs = CriticalSection::enter();
        let flag_clear = !self.state.wake_flag().is_set(&cs);
        self.log.borrow_mut().push(Event::Arm { timeout, flag_clear });
    }

    fn disarm(&mut self) {
        self.log.borrow_mut().push(Event::Disarm);
    }

    fn clear_pending(&mut self) {
        self.log.borrow_mut().push(Event::ClearPending);
    }

    fn freeze_in_debug(&mut self) {
        self.log.borrow_mut().push(Event::FreezeInDebug);
    }
}

// ============ Scheduler ============

pub struct MockScheduler {
    log: Log,
    pub readiness: SleepReadiness,
    pub expected_idle: OsTick,
    pub isr_ticks: OsTick,
}

impl MockScheduler {
    pub fn new(log: Log, readiness: SleepReadiness) -> Self {
        Self {
            log,
            readiness,
            expected_idle: OsTick::MAX,
            isr_ticks: 0,
        }
    }
}

impl SchedulerTick for MockScheduler {
    fn query_sleep_readiness(&mut self) -> SleepReadiness {
        self.log.borrow_mut().push(Event::Query);
        self.readiness
    }

    fn expected_idle_ticks(&self) -> OsTick {
        self.expected_idle
    }

    fn suspend_periodic_tick(&mut self) {
        self.log.borrow_mut().push(Event::Suspend);
    }

    fn resume_periodic_tick(&mut self) {
        self.log.borrow_mut().push(Event::Resume);
    }

    fn advance_tick_count(&mut self, by: OsTick) {
        self.log.borrow_mut().push(Event::Advance(by));
    }

    fn tick_from_isr(&mut self) -> bool {
        self.isr_ticks += 1;
        false
    }
}

// ============ Platform ============

/// What ends the low-power state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The armed sleep deadline matches
    TimerMatch,
    /// Some unrelated interrupt
    OtherInterrupt,
}

pub struct MockPlatform {
    log: Log,
    state: &'static TickState,
    pub wake: Wake,
    pub match_actions: Vec<MatchAction>,
}

impl MockPlatform {
    pub fn new(log: Log, state: &'static TickState, wake: Wake) -> Self {
        Self {
            log,
            state,
            wake,
            match_actions: Vec::new(),
        }
    }
}

impl PowerPlatform for MockPlatform {
    fn enter_low_power_retention(&mut self, wake_on_interrupt: bool) {
        self.log.borrow_mut().push(Event::EnterLowPower(wake_on_interrupt));

        // Only a sleep deadline is armed to match while retained
        if self.wake == Wake::TimerMatch && self.state.mode() == TickMode::SleepDeadline {
            self.match_actions.push(self.state.on_compare_match());
        }
    }

    fn restore_clock_configuration(&mut self) {
        self.log.borrow_mut().push(Event::RestoreClocks);
    }

    fn pre_sleep(&mut self, expected_idle: OsTick) {
        self.log.borrow_mut().push(Event::PreSleep(expected_idle));
    }

    fn post_sleep(&mut self, expected_idle: OsTick) {
        self.log.borrow_mut().push(Event::PostSleep(expected_idle));
    }
}

// ============ Harness ============

pub type MockController = SleepController<'static, MockTimer, MockScheduler, MockPlatform>;

/// Started controller with the build configuration and an empty log
pub fn controller(readiness: SleepReadiness, wake: Wake) -> (MockController, Log) {
    controller_with(LPTIM_CONFIG, readiness, wake)
}

pub fn controller_with(
    cfg: TimerConfig,
    readiness: SleepReadiness,
    wake: Wake,
) -> (MockController, Log) {
    let log = new_log();
    let state = leak_state();

    let mut ctl = SleepController::new(
        state,
        TickTimer::new(MockTimer::new(log.clone(), state), cfg),
        MockScheduler::new(log.clone(), readiness),
        MockPlatform::new(log.clone(), state, wake),
    );
    ctl.start();
    log.borrow_mut().clear();

    (ctl, log)
}
