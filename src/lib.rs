//! Tickless low-power idle for a preemptive RTOS
//!
//! Replaces the periodic tick with a low-power timeout timer and provides:
//! - A one-tick cadence driven by the timer's compare-match interrupt
//! - Tick suppression with deep-sleep entry while the scheduler is idle
//! - Reconciliation of slept time with the scheduler tick count
//! - An STM32L4 port (LPTIM1 + STOP1)

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod kernel;
pub mod port;

// ============ Re-exports ============

pub use kernel::config;
pub use kernel::config::*;
pub use kernel::critical;
pub use kernel::error;
pub use kernel::error::{ConfigError, FatalError};
pub use kernel::types;
pub use kernel::types::*;
pub use kernel::sched;
pub use kernel::sched::{SchedulerTick, TickKernel, KERNEL};
pub use kernel::time;
pub use kernel::lptim;
pub use kernel::lptim::{LowPowerTimer, TickTimer};
pub use kernel::classify::classify;
pub use kernel::reconcile;
pub use kernel::idle;
pub use kernel::idle::{SleepController, SleepOutcome, SleepStats};
pub use port::PowerPlatform;

#[cfg(feature = "pac")]
pub use stm32_metapac as pac;
