//! Kernel configuration
//!
//! Capacities are compile-time constants: every queue and table is a
//! fixed-size array so nothing is allocated after start-up. Heartbeat rates
//! and the core clock are run-time values carried by [`KernelConfig`].

use static_assertions::const_assert;

/// Capacity of the normal-priority message queue
pub const STANDARD_MESSAGES: usize = 4;

/// Capacity of the urgent message queue
pub const PRIORITY_MESSAGES: usize = 4;

/// Capacity of the pending-callback queue serviced by the deferred exception
pub const STANDARD_CALLBACKS: usize = 4;

/// Maximum number of components taking part in broadcast
pub const MAX_OBJECTS: usize = 32;

/// Number of timeout slots
pub const MAX_SIGNALS: usize = 16;

/// Message kinds strictly above this value go to the urgent queue
pub const PRIORITY_BORDERLINE: u32 = 0xFFFF_0000;

/// Shortest timeout accepted by `install_timeout` (milliseconds)
pub const MIN_TIMEOUT_MS: u32 = 1;

/// Longest timeout accepted by `install_timeout` (milliseconds)
pub const MAX_TIMEOUT_MS: u32 = 10_000;

/// Heartbeat frequency
pub const TICK_HZ: u32 = 1_000;

const_assert!(STANDARD_MESSAGES > 0);
const_assert!(PRIORITY_MESSAGES > 0);
const_assert!(STANDARD_CALLBACKS > 0);
const_assert!(MAX_OBJECTS > 0);
const_assert!(MAX_SIGNALS > 0);
const_assert!(MIN_TIMEOUT_MS >= 1);
const_assert!(MIN_TIMEOUT_MS <= MAX_TIMEOUT_MS);
const_assert!((MAX_TIMEOUT_MS as u64) < (i32::MAX as u64));

/// Run-time kernel configuration
///
/// Rates are expressed in heartbeats (milliseconds). A rate of 0 disables
/// the corresponding periodic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Period of `TIME_TICK` messages
    pub tick_rate: u16,

    /// Period of `KEY_SCAN` (input scan) messages
    pub scan_rate: u16,

    /// Period of `REPAINT` (output update) messages
    pub update_rate: u16,

    /// Frequency feeding the tick timer, used for the 1 ms reload value
    pub core_clock_hz: u32,
}

impl KernelConfig {
    pub const DEFAULT: Self = Self {
        tick_rate: 1,
        scan_rate: 10,
        update_rate: 20,
        core_clock_hz: 8_000_000,
    };

    /// Reload value that makes the tick timer fire at [`TICK_HZ`]
    ///
    /// The timer counts `reload..=0`, so one period is `reload + 1` cycles.
    pub const fn tick_reload(&self) -> u32 {
        let cycles = self.core_clock_hz / TICK_HZ;
        if cycles == 0 {
            0
        } else {
            cycles - 1
        }
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
