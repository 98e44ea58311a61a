//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default per-transaction watchdog deadline in microseconds.
///
/// Sized for a worst-case 32-byte transfer at 100 kHz standard mode with
/// generous slave clock stretching.
pub const DEFAULT_TRANSACTION_TIMEOUT_US: u32 = 25_000;

/// Per-instance engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Transaction watchdog deadline in microseconds. 0 disables the
    /// watchdog entirely: a stalled transaction is never engine-terminated.
    pub timeout_us: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_us: DEFAULT_TRANSACTION_TIMEOUT_US,
        }
    }
}

impl EngineConfig {
    /// Config with the watchdog disabled.
    pub const fn no_timeout() -> Self {
        Self { timeout_us: 0 }
    }

    /// Replace the watchdog deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }
}
