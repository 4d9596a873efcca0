//! Timeout table
//!
//! A fixed pool of one-shot countdowns. Each armed slot holds a borrowed
//! [`AtomicBool`] and the number of milliseconds left; the heartbeat calls
//! [`TimeoutTable::update`] once per tick and the flag is raised when the
//! countdown reaches zero. Waiting is cooperative: the owner polls its flag.
//!
//! ```
//! use core::sync::atomic::{AtomicBool, Ordering};
//! use pulse_kernel::TimeoutTable;
//!
//! static DONE: AtomicBool = AtomicBool::new(false);
//!
//! let mut table = TimeoutTable::new();
//! table.install(&DONE, 2).unwrap();
//! table.update();
//! assert!(!DONE.load(Ordering::Acquire));
//! table.update();
//! assert!(DONE.load(Ordering::Acquire));
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::{MAX_SIGNALS, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS};
use crate::error::{KernelError, Result};

#[derive(Clone, Copy)]
struct Slot<'a> {
    flag: Option<&'a AtomicBool>,
    remaining: u32,
}

impl Slot<'_> {
    const FREE: Self = Self {
        flag: None,
        remaining: 0,
    };
}

pub struct TimeoutTable<'a> {
    slots: [Slot<'a>; MAX_SIGNALS],
}

impl<'a> TimeoutTable<'a> {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::FREE; MAX_SIGNALS],
        }
    }

    /// Arm a countdown of `delay_ms` that raises `flag` when it expires
    ///
    /// The delay is clamped to `MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS`. The flag is
    /// only ever written `true`; clearing it before arming is up to the caller.
    ///
    /// # Errors
    /// Returns `TimeoutPoolExhausted` if every slot is armed
    pub fn install(&mut self, flag: &'a AtomicBool, delay_ms: u32) -> Result<()> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.flag.is_none())
            .ok_or(KernelError::TimeoutPoolExhausted { slots: MAX_SIGNALS })?;

        slot.flag = Some(flag);
        slot.remaining = delay_ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS);
        Ok(())
    }

    /// Advance every armed countdown by one millisecond
    ///
    /// Returns the number of flags raised by this call.
    pub fn update(&mut self) -> u32 {
        let mut fired = 0;

        for slot in self.slots.iter_mut() {
            let Some(flag) = slot.flag else {
                continue;
            };

            slot.remaining = slot.remaining.saturating_sub(1);
            if slot.remaining == 0 {
                flag.store(true, Ordering::Release);
                *slot = Slot::FREE;
                fired += 1;
            }
        }

        fired
    }

    /// Number of armed slots
    pub fn armed(&self) -> usize {
        self.slots.iter().filter(|slot| slot.flag.is_some()).count()
    }

    /// Disarm every slot without raising any flag
    pub fn clear(&mut self) {
        self.slots = [Slot::FREE; MAX_SIGNALS];
    }
}

impl Default for TimeoutTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}
