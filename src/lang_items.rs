//! Panic handlers, fault handler and log timestamp for the target

// When defmt feature is enabled on ARM targets, use defmt_rtt and panic_probe
#[cfg(all(feature = "defmt", target_arch = "arm"))]
use defmt_rtt as _;

#[cfg(all(feature = "defmt", target_arch = "arm"))]
use panic_probe as _;

// Fatal configuration faults end up here after being logged
#[cfg(all(feature = "defmt", target_arch = "arm"))]
#[defmt::panic_handler]
fn defmt_panic() -> ! {
    cortex_m::asm::udf()
}

// Without defmt there is nowhere to report to; halt in place
#[cfg(all(not(feature = "defmt"), target_arch = "arm"))]
use panic_halt as _;

// Default HardFault handler
#[cfg(target_arch = "arm")]
#[cortex_m_rt::exception]
unsafe fn HardFault(_ef: &cortex_m_rt::ExceptionFrame) -> ! {
    loop { cortex_m::asm::udf(); }
}

// Log lines carry the scheduler tick, which stays correct across sleeps
#[cfg(all(feature = "defmt", target_arch = "arm"))]
defmt::timestamp!("{=u32}", crate::kernel::sched::KERNEL.tick_get());
