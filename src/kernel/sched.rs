//! Scheduler tick interface
//!
//! The sleep controller never touches the scheduler's data structures. It
//! sees the scheduler only through [`SchedulerTick`]. [`TickKernel`] is the
//! tick bookkeeping block this crate ships: an atomic tick counter with the
//! next unblock time and ready/yield indicators the task layer feeds.

use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::error::{fatal, FatalError};
use crate::types::{OsTick, SleepReadiness};

/// Operations the tickless idle path needs from the scheduler
pub trait SchedulerTick {
    /// Decide, with interrupts masked, whether sleeping is still allowed
    fn query_sleep_readiness(&mut self) -> SleepReadiness;

    /// Ticks until the next task must run (`OsTick::MAX` when none waits)
    fn expected_idle_ticks(&self) -> OsTick;

    /// Stop the periodic tick bookkeeping ahead of a sleep
    fn suspend_periodic_tick(&mut self);

    /// Restart the periodic tick bookkeeping after a sleep
    fn resume_periodic_tick(&mut self);

    /// Wind the tick count forward by `by` ticks slept through
    fn advance_tick_count(&mut self, by: OsTick);

    /// One periodic tick from the timer interrupt.
    ///
    /// Returns `true` when a context switch should be requested.
    fn tick_from_isr(&mut self) -> bool;
}

// ============ Tick Kernel ============

/// Atomic tick bookkeeping
pub struct TickKernel {
    running: AtomicBool,
    tick_counter: AtomicU32,
    tick_suspended: AtomicBool,
    pended_ticks: AtomicU32,
    has_deadline: AtomicBool,
    next_unblock: AtomicU32,
    pending_ready: AtomicU8,
    yield_pending: AtomicBool,
}

impl TickKernel {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            tick_counter: AtomicU32::new(0),
            tick_suspended: AtomicBool::new(false),
            pended_ticks: AtomicU32::new(0),
            has_deadline: AtomicBool::new(false),
            next_unblock: AtomicU32::new(0),
            pending_ready: AtomicU8::new(0),
            yield_pending: AtomicBool::new(false),
        }
    }

    pub fn reset(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.tick_counter.store(0, Ordering::SeqCst);
        self.tick_suspended.store(false, Ordering::SeqCst);
        self.pended_ticks.store(0, Ordering::SeqCst);
        self.has_deadline.store(false, Ordering::SeqCst);
        self.next_unblock.store(0, Ordering::SeqCst);
        self.pending_ready.store(0, Ordering::SeqCst);
        self.yield_pending.store(false, Ordering::SeqCst);
    }

    /// Check if the scheduler is running
    #[inline(always)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn set_running(&self, val: bool) {
        self.running.store(val, Ordering::SeqCst);
    }

    /// Get current tick count
    #[inline(always)]
    pub fn tick_get(&self) -> OsTick {
        self.tick_counter.load(Ordering::Relaxed)
    }

    /// Ticks that arrived while the periodic tick was suspended
    #[inline(always)]
    pub fn pended_ticks(&self) -> OsTick {
        self.pended_ticks.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn is_tick_suspended(&self) -> bool {
        self.tick_suspended.load(Ordering::Acquire)
    }

    /// Absolute tick at which the earliest delayed task unblocks
    #[inline]
    pub fn next_unblock(&self) -> Option<OsTick> {
        if self.has_deadline.load(Ordering::Acquire) {
            Some(self.next_unblock.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Record the earliest unblock time among delayed tasks
    pub fn set_next_unblock(&self, tick: OsTick) {
        self.next_unblock.store(tick, Ordering::Relaxed);
        self.has_deadline.store(true, Ordering::Release);
    }

    /// No delayed task is left
    pub fn clear_next_unblock(&self) {
        self.has_deadline.store(false, Ordering::Release);
    }

    /// A task was readied while the scheduler could not switch to it
    ///
    /// Safe to call from an interrupt that preempts another `post_ready`.
    pub fn post_ready(&self) {
        // Saturates at u8::MAX; a full counter still reads as pending
        let _ = self
            .pending_ready
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |n| n.checked_add(1));
    }

    /// Readied tasks not yet switched to
    #[inline(always)]
    pub fn pending_ready(&self) -> u8 {
        self.pending_ready.load(Ordering::Acquire)
    }

    /// The pending-ready list has been drained
    pub fn clear_ready(&self) {
        self.pending_ready.store(0, Ordering::Release);
    }

    /// A yield was requested but not yet performed
    pub fn request_yield(&self) {
        self.yield_pending.store(true, Ordering::Release);
    }

    pub fn clear_yield(&self) {
        self.yield_pending.store(false, Ordering::Release);
    }

    /// Ticks remaining until `next_unblock`, 0 if already reached
    fn ticks_to_deadline(&self, now: OsTick) -> Option<OsTick> {
        self.next_unblock().map(|deadline| {
            let remaining = deadline.wrapping_sub(now);
            // Past deadlines show up as a huge wrapped distance
            if remaining as i32 <= 0 {
                0
            } else {
                remaining
            }
        })
    }

    /// Increment and report whether the next unblock time was reached
    fn tick_increment(&self) -> bool {
        let tick = self.tick_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        matches!(self.ticks_to_deadline(tick), Some(0))
    }
}

impl Default for TickKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerTick for &TickKernel {
    fn query_sleep_readiness(&mut self) -> SleepReadiness {
        if self.pending_ready() > 0
            || self.yield_pending.load(Ordering::Acquire)
        {
            SleepReadiness::Abort
        } else if self.next_unblock().is_none() {
            SleepReadiness::NoDeadlinePending
        } else {
            SleepReadiness::DeadlinePending
        }
    }

    fn expected_idle_ticks(&self) -> OsTick {
        self.ticks_to_deadline(self.tick_get()).unwrap_or(OsTick::MAX)
    }

    fn suspend_periodic_tick(&mut self) {
        self.tick_suspended.store(true, Ordering::Release);
    }

    /// Replays ticks pended by `tick_from_isr` while suspended.
    ///
    /// The sleep controller's own timer never delivers a tick while
    /// suspended (it is disarmed or in sleep-deadline mode). Pended ticks
    /// come from other tick sources calling `tick_from_isr` directly, such as
    /// a port that keeps a secondary tick running during sleep.
    fn resume_periodic_tick(&mut self) {
        self.tick_suspended.store(false, Ordering::Release);

        let pended = self.pended_ticks.swap(0, Ordering::Relaxed);
        for _ in 0..pended {
            if self.tick_increment() {
                self.request_yield();
            }
        }
    }

    fn advance_tick_count(&mut self, by: OsTick) {
        let tick = self.tick_get();
        if let Some(remaining) = self.ticks_to_deadline(tick) {
            if by > remaining {
                fatal(FatalError::TickStepOvershoot {
                    tick,
                    step: by,
                    next_unblock: tick.wrapping_add(remaining),
                });
            }
        }
        self.tick_counter.store(tick.wrapping_add(by), Ordering::Relaxed);
    }

    fn tick_from_isr(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        if self.is_tick_suspended() {
            self.pended_ticks.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.tick_increment()
    }
}

// ============ Global Instances ============

/// Global tick kernel instance
pub static KERNEL: TickKernel = TickKernel::new();
