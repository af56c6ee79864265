//! Port layer - platform-specific implementations
//!
//! [`PowerPlatform`] is the clock/power seam the sleep controller drives.
//! The STM32L4 port supplies it together with the LPTIM1 timer driver and
//! the compare-match interrupt vector.

use crate::types::OsTick;

/// Low-power entry and clock recovery
pub trait PowerPlatform {
    /// Enter the deepest safe retention state; returns once woken.
    ///
    /// With `wake_on_interrupt` the core waits for an interrupt, otherwise
    /// for an event.
    fn enter_low_power_retention(&mut self, wake_on_interrupt: bool);

    /// Rebuild whatever clock configuration the retention state disturbed.
    /// Called immediately after every wake.
    fn restore_clock_configuration(&mut self);

    /// Hook run just before entering retention
    fn pre_sleep(&mut self, _expected_idle: OsTick) {}

    /// Hook run right after clocks are restored
    fn post_sleep(&mut self, _expected_idle: OsTick) {}
}

#[cfg(all(target_arch = "arm", feature = "pac"))]
pub mod stm32l4;
