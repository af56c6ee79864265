//! Logging macros for the tickless idle path
//!
//! Forward to defmt on the target when the `defmt` feature is enabled.
//! Host builds (unit tests) never link a defmt logger, so the macros
//! expand to nothing there.

/// Debug message
#[cfg(all(feature = "defmt", target_arch = "arm"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

/// Info message
#[cfg(all(feature = "defmt", target_arch = "arm"))]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}

/// Error message
#[cfg(all(feature = "defmt", target_arch = "arm"))]
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { defmt::error!($($arg)*) };
}

/// Trace message
#[cfg(all(feature = "defmt", target_arch = "arm"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

/// Warning message
#[cfg(all(feature = "defmt", target_arch = "arm"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

// No-op versions for host builds or when defmt is disabled
#[cfg(not(all(feature = "defmt", target_arch = "arm")))]
#[macro_export]
macro_rules! debug { ($($arg:tt)*) => {}; }
#[cfg(not(all(feature = "defmt", target_arch = "arm")))]
#[macro_export]
macro_rules! info { ($($arg:tt)*) => {}; }
#[cfg(not(all(feature = "defmt", target_arch = "arm")))]
#[macro_export]
macro_rules! error { ($($arg:tt)*) => {}; }
#[cfg(not(all(feature = "defmt", target_arch = "arm")))]
#[macro_export]
macro_rules! trace { ($($arg:tt)*) => {}; }
#[cfg(not(all(feature = "defmt", target_arch = "arm")))]
#[macro_export]
macro_rules! warn { ($($arg:tt)*) => {}; }
