//! Wake classifier
//!
//! Maps the scheduler's sleep-readiness answer onto a sleep strategy. Must
//! be evaluated with interrupts masked, in the same critical section that
//! later arms the timer, so a task readied in between forces an abort
//! instead of being slept through.

use crate::types::{OsTick, SleepReadiness, SleepStrategy};

/// Choose how to sleep for an already clamped `expected_idle`
///
/// A pending deadline with nothing left to sleep is an abort: there is no
/// timeout to arm.
#[inline]
pub fn classify(readiness: SleepReadiness, expected_idle: OsTick) -> SleepStrategy {
    match readiness {
        SleepReadiness::Abort => SleepStrategy::Abort,
        SleepReadiness::NoDeadlinePending => SleepStrategy::Unbounded,
        SleepReadiness::DeadlinePending if expected_idle == 0 => SleepStrategy::Abort,
        SleepReadiness::DeadlinePending => SleepStrategy::Bounded(expected_idle),
    }
}
