//! Compile-time configuration for the low-power tick source
//!
//! These constants fix the relation between the scheduler's Tick Period and
//! the low-power timer's counting unit. They are validated in a const context,
//! so an inconsistent combination fails the build instead of drifting at run
//! time.

use crate::error::{fatal, ConfigError, ConfigResult, FatalError};
use crate::types::{OsTick, TimerTicks};

/// Low-power timer input clock in Hz (LSE)
pub const CFG_LPTIM_INPUT_FREQ_HZ: u32 = 32_768;

/// Low-power timer prescaler
pub const CFG_LPTIM_PRESCALER: u32 = 32;

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Largest value the timer's compare/autoreload registers can hold
pub const CFG_LPTIM_MAX_COUNT: TimerTicks = 0xFFFF;

/// Tick periods armed for the normal running cadence
pub const CFG_TICK_INTERVAL: OsTick = 1;

/// Shortest expected idle time worth suppressing the tick for
pub const CFG_EXPECTED_IDLE_TIME_BEFORE_SLEEP: OsTick = 2;

/// Validated timer/tick relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    input_freq_hz: u32,
    prescaler: u32,
    tick_rate_hz: u32,
    max_count: TimerTicks,
    ticks_per_tick: TimerTicks,
    max_suppressible_ticks: OsTick,
}

impl TimerConfig {
    /// Derive the timer/tick relation, rejecting combinations that cannot
    /// represent a single Tick Period.
    pub const fn new(
        input_freq_hz: u32,
        prescaler: u32,
        tick_rate_hz: u32,
        max_count: TimerTicks,
    ) -> ConfigResult<Self> {
        if prescaler == 0 {
            return Err(ConfigError::ZeroPrescaler);
        }
        if tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if max_count == 0 {
            return Err(ConfigError::ZeroMaxCount);
        }

        let counter_hz = input_freq_hz / prescaler;
        let ticks_per_tick = counter_hz / tick_rate_hz;

        if ticks_per_tick == 0 {
            return Err(ConfigError::TicksPerTickZero);
        }
        if ticks_per_tick > max_count {
            return Err(ConfigError::TickPeriodExceedsSpan);
        }

        Ok(Self {
            input_freq_hz,
            prescaler,
            tick_rate_hz,
            max_count,
            ticks_per_tick,
            max_suppressible_ticks: max_count / ticks_per_tick,
        })
    }

    /// Evaluate the `CFG_*` build constants
    pub const fn from_build_constants() -> Self {
        match Self::new(
            CFG_LPTIM_INPUT_FREQ_HZ,
            CFG_LPTIM_PRESCALER,
            CFG_TICK_RATE_HZ,
            CFG_LPTIM_MAX_COUNT,
        ) {
            Ok(cfg) => cfg,
            Err(ConfigError::ZeroPrescaler) => panic!("CFG_LPTIM_PRESCALER must be non-zero"),
            Err(ConfigError::ZeroTickRate) => panic!("CFG_TICK_RATE_HZ must be non-zero"),
            Err(ConfigError::ZeroMaxCount) => panic!("CFG_LPTIM_MAX_COUNT must be non-zero"),
            Err(ConfigError::TicksPerTickZero) => {
                panic!("LPTIM counter is slower than the tick rate")
            }
            Err(ConfigError::TickPeriodExceedsSpan) => {
                panic!("one tick period does not fit in the LPTIM counter")
            }
        }
    }

    /// Same as [`TimerConfig::new`] for configurations assembled at init
    /// time; an inconsistency halts startup through the fatal path.
    pub fn validated(
        input_freq_hz: u32,
        prescaler: u32,
        tick_rate_hz: u32,
        max_count: TimerTicks,
    ) -> Self {
        match Self::new(input_freq_hz, prescaler, tick_rate_hz, max_count) {
            Ok(cfg) => cfg,
            Err(err) => fatal(FatalError::Config(err)),
        }
    }

    #[inline(always)]
    pub const fn input_freq_hz(&self) -> u32 {
        self.input_freq_hz
    }

    #[inline(always)]
    pub const fn prescaler(&self) -> u32 {
        self.prescaler
    }

    #[inline(always)]
    pub const fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    /// Timer register capacity
    #[inline(always)]
    pub const fn max_count(&self) -> TimerTicks {
        self.max_count
    }

    /// Timer ticks in one Tick Period (always >= 1)
    #[inline(always)]
    pub const fn ticks_per_tick(&self) -> TimerTicks {
        self.ticks_per_tick
    }

    /// Longest idle span, in Tick Periods, the timer can time in one shot
    #[inline(always)]
    pub const fn max_suppressible_ticks(&self) -> OsTick {
        self.max_suppressible_ticks
    }

    /// Limit an expected idle time to what the timer can represent
    #[inline]
    pub const fn clamp_idle(&self, expected_idle: OsTick) -> OsTick {
        if expected_idle > self.max_suppressible_ticks {
            self.max_suppressible_ticks
        } else {
            expected_idle
        }
    }
}

/// Timer configuration derived from the build constants
pub const LPTIM_CONFIG: TimerConfig = TimerConfig::from_build_constants();
