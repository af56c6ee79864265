//! Core type definitions for the tickless idle path

/// Tick counter type (Tick Periods)
pub type OsTick = u32;

/// Low-power timer counting unit
pub type TimerTicks = u32;

/// Answer of the scheduler's sleep-readiness query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SleepReadiness {
    /// A task became ready while preparing to sleep
    Abort = 0,
    /// No task waits on a timeout
    NoDeadlinePending = 1,
    /// At least one task waits on a timeout
    DeadlinePending = 2,
}

/// How the idle path sleeps this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepStrategy {
    /// Do not sleep
    Abort,
    /// Sleep until any interrupt, no deadline armed
    Unbounded,
    /// Sleep for up to this many Tick Periods
    Bounded(OsTick),
}

/// Sleep controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IdlePhase {
    /// Tick interrupt active, normal operation
    Running = 0,
    /// Interrupts masked, classifier being queried
    PreparingSleep = 1,
    /// Tick suspended, CPU in low-power retention
    Sleeping = 2,
    /// Interrupts masked, computing elapsed ticks
    Reconciling = 3,
}

/// What a compare-match currently means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TickMode {
    /// Scheduler not started; matches are ignored
    Stopped = 0,
    /// Each match is one periodic tick
    Periodic = 1,
    /// A match ends a suppressed-tick sleep
    SleepDeadline = 2,
}

impl From<u8> for TickMode {
    fn from(value: u8) -> Self {
        match value {
            1 => TickMode::Periodic,
            2 => TickMode::SleepDeadline,
            _ => TickMode::Stopped,
        }
    }
}

/// Action the compare-match handler must take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatchAction {
    /// Scheduler not started
    Ignore,
    /// Advance one tick and re-arm one Tick Period
    Tick,
    /// Sleep deadline reached; the sleep controller accounts for it
    WakeRecorded,
}
