//! Low-power timeout timer
//!
//! [`LowPowerTimer`] is the hardware seam: a countdown that raises a
//! compare-match interrupt once a programmed number of its own ticks has
//! elapsed. [`TickTimer`] wraps it with the validated timer configuration and
//! works in Tick Periods, refusing any timeout the register cannot hold.

use crate::config::{TimerConfig, CFG_TICK_INTERVAL};
use crate::error::{fatal, FatalError};
use crate::types::{OsTick, TimerTicks};

/// Hardware countdown timer with a compare-match interrupt
pub trait LowPowerTimer {
    /// Start a one-shot timeout of `timeout` timer ticks.
    ///
    /// Re-arming while already armed reprograms the deadline.
    fn arm(&mut self, timeout: TimerTicks);

    /// Stop counting; no match will fire
    fn disarm(&mut self);

    /// Acknowledge a stale match indication left in hardware
    fn clear_pending(&mut self);

    /// Keep the timer from counting while a debugger halts the core
    fn freeze_in_debug(&mut self) {}
}

/// Tick-period view of a [`LowPowerTimer`]
pub struct TickTimer<T> {
    hw: T,
    cfg: TimerConfig,
    armed: Option<TimerTicks>,
}

impl<T: LowPowerTimer> TickTimer<T> {
    pub const fn new(hw: T, cfg: TimerConfig) -> Self {
        Self { hw, cfg, armed: None }
    }

    #[inline(always)]
    pub fn config(&self) -> &TimerConfig {
        &self.cfg
    }

    /// Timeout last programmed through this wrapper, if still armed
    #[inline(always)]
    pub fn armed(&self) -> Option<TimerTicks> {
        self.armed
    }

    #[inline(always)]
    pub fn hw(&self) -> &T {
        &self.hw
    }

    #[inline(always)]
    pub fn hw_mut(&mut self) -> &mut T {
        &mut self.hw
    }

    /// Program a raw timeout in timer ticks
    pub fn arm(&mut self, timeout: TimerTicks) {
        if timeout == 0 {
            fatal(FatalError::TimerZeroTimeout);
        }
        if timeout > self.cfg.max_count() {
            fatal(FatalError::TimerOverflow {
                requested: timeout,
                max: self.cfg.max_count(),
            });
        }

        self.hw.arm(timeout);
        self.armed = Some(timeout);
    }

    /// Program a timeout of `periods` Tick Periods; returns the timer ticks armed
    pub fn arm_periods(&mut self, periods: OsTick) -> TimerTicks {
        let timeout = match periods.checked_mul(self.cfg.ticks_per_tick()) {
            Some(t) => t,
            None => fatal(FatalError::TimerOverflow {
                requested: TimerTicks::MAX,
                max: self.cfg.max_count(),
            }),
        };
        self.arm(timeout);
        timeout
    }

    /// Normal running cadence: one Tick Period
    #[inline]
    pub fn arm_one_tick(&mut self) {
        self.arm_periods(CFG_TICK_INTERVAL);
    }

    pub fn disarm(&mut self) {
        self.hw.disarm();
        self.armed = None;
    }

    pub fn clear_pending(&mut self) {
        self.hw.clear_pending();
    }

    pub fn freeze_in_debug(&mut self) {
        self.hw.freeze_in_debug();
    }
}
