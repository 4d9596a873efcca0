//! Host simulation port
//!
//! [`SimPort`] stands in for the board in tests and benchmarks. It records
//! every kernel request in atomics and models the tick timer as a free-running
//! down-counter that advances `step` cycles each time it is read, so busy
//! waits built on the counter make progress without real hardware.
//!
//! `halt` panics instead of spinning, which lets fault paths be tested with
//! `#[should_panic]`.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::Port;

pub struct SimPort {
    reload: AtomicU32,
    counter: AtomicU32,
    step: AtomicU32,
    tick_enabled: AtomicBool,
    deferred_pending: AtomicBool,
    deferred_requests: AtomicU32,
    sleep_on_exit: AtomicBool,
    deep_sleep: AtomicBool,
    watchdog_kicks: AtomicU32,
    waits: AtomicU32,
    relocations: AtomicU32,
}

impl SimPort {
    pub const fn new() -> Self {
        Self {
            reload: AtomicU32::new(0),
            counter: AtomicU32::new(0),
            step: AtomicU32::new(0),
            tick_enabled: AtomicBool::new(false),
            deferred_pending: AtomicBool::new(false),
            deferred_requests: AtomicU32::new(0),
            sleep_on_exit: AtomicBool::new(false),
            deep_sleep: AtomicBool::new(false),
            watchdog_kicks: AtomicU32::new(0),
            waits: AtomicU32::new(0),
            relocations: AtomicU32::new(0),
        }
    }

    /// Cycles the counter moves down on every `tick_counter` read
    pub fn set_step(&self, step: u32) {
        self.step.store(step, Ordering::Relaxed);
    }

    /// Force the counter to `value`
    pub fn set_counter(&self, value: u32) {
        self.counter.store(value, Ordering::Relaxed);
    }

    /// Counter value without advancing it
    pub fn peek_counter(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn tick_enabled(&self) -> bool {
        self.tick_enabled.load(Ordering::Relaxed)
    }

    pub fn deferred_pending(&self) -> bool {
        self.deferred_pending.load(Ordering::Relaxed)
    }

    /// Total `pend_deferred` calls
    pub fn deferred_requests(&self) -> u32 {
        self.deferred_requests.load(Ordering::Relaxed)
    }

    pub fn sleep_on_exit(&self) -> bool {
        self.sleep_on_exit.load(Ordering::Relaxed)
    }

    pub fn deep_sleep(&self) -> bool {
        self.deep_sleep.load(Ordering::Relaxed)
    }

    pub fn watchdog_kicks(&self) -> u32 {
        self.watchdog_kicks.load(Ordering::Relaxed)
    }

    pub fn waits(&self) -> u32 {
        self.waits.load(Ordering::Relaxed)
    }

    pub fn relocations(&self) -> u32 {
        self.relocations.load(Ordering::Relaxed)
    }
}

impl Default for SimPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Port for SimPort {
    fn configure_tick(&self, reload: u32) {
        self.reload.store(reload, Ordering::Relaxed);
        self.counter.store(reload, Ordering::Relaxed);
    }

    fn enable_tick(&self) {
        self.tick_enabled.store(true, Ordering::Relaxed);
    }

    fn disable_tick(&self) {
        self.tick_enabled.store(false, Ordering::Relaxed);
    }

    fn tick_counter(&self) -> u32 {
        let step = self.step.load(Ordering::Relaxed);
        let period = u64::from(self.reload.load(Ordering::Relaxed)) + 1;

        let previous = self
            .counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                // Count down and restart from `reload` on underflow
                let current = u64::from(current) % period;
                let next = (current + period - u64::from(step) % period) % period;
                Some(next as u32)
            });

        match previous {
            Ok(value) | Err(value) => value,
        }
    }

    fn tick_reload(&self) -> u32 {
        self.reload.load(Ordering::Relaxed)
    }

    fn pend_deferred(&self) {
        self.deferred_pending.store(true, Ordering::Relaxed);
        self.deferred_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn clear_deferred(&self) {
        self.deferred_pending.store(false, Ordering::Relaxed);
    }

    fn wait_for_interrupt(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    fn set_sleep_on_exit(&self, enabled: bool) {
        self.sleep_on_exit.store(enabled, Ordering::Relaxed);
    }

    fn set_deep_sleep(&self, enabled: bool) {
        self.deep_sleep.store(enabled, Ordering::Relaxed);
    }

    fn kick_watchdog(&self) {
        self.watchdog_kicks.fetch_add(1, Ordering::Relaxed);
    }

    fn relocate_vectors(&self) {
        self.relocations.fetch_add(1, Ordering::Relaxed);
    }

    fn halt(&self) -> ! {
        panic!("SimPort halted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_counts_down_and_wraps() {
        let port = SimPort::new();
        port.configure_tick(9);
        port.set_step(4);

        assert_eq!(port.tick_counter(), 9);
        assert_eq!(port.tick_counter(), 5);
        assert_eq!(port.tick_counter(), 1);
        // 1 - 4 wraps through 0 back to the reload value: 1 -> 0 -> 9 -> 8 -> 7
        assert_eq!(port.tick_counter(), 7);
    }

    #[test]
    fn test_counter_without_step_is_frozen() {
        let port = SimPort::new();
        port.configure_tick(99);
        port.set_counter(42);

        assert_eq!(port.tick_counter(), 42);
        assert_eq!(port.tick_counter(), 42);
    }

    #[test]
    fn test_deferred_request_tracking() {
        let port = SimPort::new();
        port.pend_deferred();
        port.pend_deferred();
        assert!(port.deferred_pending());
        assert_eq!(port.deferred_requests(), 2);

        port.clear_deferred();
        assert!(!port.deferred_pending());
    }

    #[test]
    #[should_panic(expected = "SimPort halted")]
    fn test_halt_panics() {
        SimPort::new().halt();
    }
}
