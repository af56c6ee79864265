//! Tick reconciliation
//!
//! After a bounded sleep, decide how many whole Tick Periods to credit to
//! the scheduler and how to re-arm the timer.
//!
//! When the deadline match fired, the whole requested span elapsed. When it
//! did not, something else woke the core and the timer count cannot be read
//! back reliably once it has woken, so the caller passes the best estimate
//! it has: the full armed span. This over-credits on early wakes.

use crate::config::TimerConfig;
use crate::types::{OsTick, TimerTicks};

/// How the timer is re-armed once the sleep is accounted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rearm {
    /// Back to the one-Tick-Period cadence
    OneTick,
    /// Keep the rest of the deadline armed
    Remaining(OsTick),
}

/// Outcome of reconciling one sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reconciliation {
    /// Whole Tick Periods to step, always within `[0, requested]`
    pub complete: OsTick,
    pub rearm: Rearm,
}

/// Reconcile a bounded sleep of `requested` Tick Periods.
///
/// `estimated_elapsed` is in timer ticks and only consulted when the
/// deadline match did not fire.
pub fn reconcile(
    cfg: &TimerConfig,
    requested: OsTick,
    deadline_fired: bool,
    estimated_elapsed: TimerTicks,
) -> Reconciliation {
    if deadline_fired {
        return Reconciliation {
            complete: requested,
            rearm: Rearm::OneTick,
        };
    }

    let complete = (estimated_elapsed / cfg.ticks_per_tick()).min(requested);

    if complete == 0 {
        // Less than one period counted
        return Reconciliation {
            complete: 0,
            rearm: Rearm::OneTick,
        };
    }

    let remaining = requested - complete;
    Reconciliation {
        complete,
        rearm: if remaining == 0 {
            Rearm::OneTick
        } else {
            Rearm::Remaining(remaining)
        },
    }
}
