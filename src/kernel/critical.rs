//! Critical section handling for the idle path
//!
//! The sleep controller holds a [`CriticalSection`] from the classifier query
//! until the tick count has been stepped. Interrupts that arrive in between
//! stay pending in the NVIC and are delivered afterwards, never lost.

/// RAII guard for critical sections
///
/// When this guard is created, interrupts are disabled.
/// When it is dropped, interrupts are restored to their previous state.
/// Functions that must only run masked take `&CriticalSection` as proof.
pub struct CriticalSection {
    #[cfg_attr(not(target_arch = "arm"), allow(dead_code))]
    was_active: bool,
}

impl CriticalSection {
    /// Enter a critical section by disabling interrupts.
    ///
    /// Returns a guard that will restore interrupt state when dropped.
    #[inline(always)]
    pub fn enter() -> Self {
        #[cfg(target_arch = "arm")]
        {
            let was_active = cortex_m::register::primask::read().is_active();
            cortex_m::interrupt::disable();
            CriticalSection { was_active }
        }

        #[cfg(not(target_arch = "arm"))]
        {
            CriticalSection { was_active: false }
        }
    }

    /// Let interrupts that became pending while masked run to completion,
    /// then mask again.
    ///
    /// Used right after waking so the timer's compare-match handler can
    /// record the wake before the controller reads the attribution flag.
    #[inline(always)]
    pub fn unmask_pending(&self) {
        #[cfg(target_arch = "arm")]
        {
            unsafe { cortex_m::interrupt::enable() };
            cortex_m::asm::isb();
            cortex_m::interrupt::disable();
        }
    }
}

impl Drop for CriticalSection {
    #[inline(always)]
    fn drop(&mut self) {
        #[cfg(target_arch = "arm")]
        if self.was_active {
            unsafe { cortex_m::interrupt::enable() };
        }
    }
}

/// Execute a closure with interrupts disabled
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    let cs = CriticalSection::enter();
    f(&cs)
}

/// Check if currently executing in an ISR context
#[inline]
pub fn is_isr_context() -> bool {
    #[cfg(target_arch = "arm")]
    {
        let ipsr: u32;
        unsafe {
            core::arch::asm!(
                "mrs {}, IPSR",
                out(reg) ipsr,
                options(nomem, nostack, preserves_flags)
            );
        }
        ipsr != 0
    }

    #[cfg(not(target_arch = "arm"))]
    {
        false
    }
}
