//! Error types for the tickless idle path
//!
//! Nothing here is recoverable at run time: the idle path runs with
//! interrupts masked and has no caller to hand an error to. Configuration
//! problems are caught while building [`TimerConfig`](crate::config::TimerConfig);
//! anything detected later is routed through [`fatal`].

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ConfigError {
    /// Prescaler of zero
    ZeroPrescaler = 1001,
    /// Tick rate of zero
    ZeroTickRate = 1002,
    /// Timer register width of zero
    ZeroMaxCount = 1003,
    /// Timer counts slower than one count per Tick Period
    TicksPerTickZero = 1004,
    /// One Tick Period does not fit in the timer register
    TickPeriodExceedsSpan = 1005,
}

/// Result type alias for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Numeric code, stable across builds
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Conditions that stop the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalError {
    /// Inconsistent timer configuration found at init
    Config(ConfigError),
    /// A timeout that does not fit the timer register
    TimerOverflow { requested: u32, max: u32 },
    /// A zero-length timeout, which would match immediately
    TimerZeroTimeout,
    /// Stepping the tick count would jump past the next unblock time
    TickStepOvershoot { tick: u32, step: u32, next_unblock: u32 },
}

/// Report a fatal condition and stop.
///
/// Timing that silently drifts is worse than a visible halt, so this
/// logs the diagnostic and panics.
#[cold]
#[inline(never)]
pub fn fatal(err: FatalError) -> ! {
    crate::error!("tickless fatal: {}", err);
    panic!("tickless fatal: {:?}", err)
}
