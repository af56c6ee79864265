//! Wake attribution flag
//!
//! The only datum shared between the compare-match interrupt and the idle
//! path. One writer (the interrupt, which only ever sets it) and one reader
//! (the sleep controller, which clears and reads it with interrupts masked).
//!
//! Ordering contract: the controller clears the flag before it arms the
//! timer and before it enters low power, so any match after arming is
//! observed. The set uses `Release` and the read `Acquire`.

use portable_atomic::{AtomicBool, Ordering};

use crate::critical::CriticalSection;

/// Single-producer / single-consumer "compare-match fired" bit
pub struct WakeFlag(AtomicBool);

impl WakeFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Record a compare-match. Interrupt context only.
    #[inline(always)]
    pub fn set_from_isr(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Forget any earlier match. Must precede arming.
    #[inline(always)]
    pub fn clear(&self, _cs: &CriticalSection) {
        self.0.store(false, Ordering::Release);
    }

    /// Has a match fired since the last [`WakeFlag::clear`]?
    #[inline(always)]
    pub fn is_set(&self, _cs: &CriticalSection) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for WakeFlag {
    fn default() -> Self {
        Self::new()
    }
}
