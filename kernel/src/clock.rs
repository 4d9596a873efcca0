//! System time and busy waits
//!
//! Millisecond time is the heartbeat count. Sub-millisecond resolution comes
//! from the tick timer itself: it counts down from `reload` to 0 once per
//! millisecond, so `reload - counter` is how far into the current millisecond
//! we are.
//!
//! `delay` and `micro_delay` spin. They never mask interrupts, and both need
//! a running tick: calling them while halted, or from a context at or above
//! the tick's priority, never returns.

use core::sync::atomic::Ordering;

use crate::config::TICK_HZ;
use crate::kernel::Kernel;
use crate::port::Port;

impl<P: Port> Kernel<'_, P> {
    /// Milliseconds since `initialize`, wrapping after ~49 days
    pub fn system_time(&self) -> u32 {
        self.time.load(Ordering::Acquire)
    }

    /// Microseconds since `initialize`, wrapping after ~71 minutes
    pub fn microseconds(&self) -> u32 {
        let reload = self.port.tick_reload();

        // Re-sample if a heartbeat landed between the two reads
        let (ms, counter) = loop {
            let before = self.system_time();
            let counter = self.port.tick_counter();
            if self.system_time() == before {
                break (before, counter);
            }
        };

        let elapsed = u64::from(reload - counter.min(reload));
        let sub_ms = elapsed * 1_000 / (u64::from(reload) + 1);
        ms.wrapping_mul(1_000).wrapping_add(sub_ms as u32)
    }

    /// Spin for at least `ms` heartbeats
    pub fn delay(&self, ms: u32) {
        let start = self.system_time();
        while self.system_time().wrapping_sub(start) < ms {
            core::hint::spin_loop();
        }
    }

    /// Spin for at least `us` microseconds by watching the tick counter
    pub fn micro_delay(&self, us: u32) {
        let period = u64::from(self.port.tick_reload()) + 1;
        let cycles_per_us = (period * u64::from(TICK_HZ) / 1_000_000).max(1);
        let target = u64::from(us) * cycles_per_us;

        let mut previous = u64::from(self.port.tick_counter());
        let mut elapsed = 0u64;

        while elapsed < target {
            let now = u64::from(self.port.tick_counter());
            elapsed += if now <= previous {
                previous - now
            } else {
                // Counter reloaded since the last sample
                previous + period - now
            };
            previous = now;
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::KernelConfig;
    use crate::kernel::{AppHooks, Kernel};
    use crate::port::sim::SimPort;
    use crate::port::Port;

    /// 8 MHz core: reload 7999, 8 cycles per microsecond
    fn kernel<'a>() -> Kernel<'a, SimPort> {
        let kernel = Kernel::new(SimPort::new(), KernelConfig::DEFAULT, AppHooks::NONE);
        kernel.port().configure_tick(KernelConfig::DEFAULT.tick_reload());
        kernel
    }

    #[test]
    fn test_system_time_counts_heartbeats() {
        let kernel = kernel();
        for _ in 0..25 {
            kernel.heartbeat();
        }
        assert_eq!(kernel.system_time(), 25);
    }

    #[test]
    fn test_system_time_wraps() {
        let kernel = kernel();
        kernel.time.store(u32::MAX - 1, core::sync::atomic::Ordering::Relaxed);
        kernel.heartbeat();
        kernel.heartbeat();
        assert_eq!(kernel.system_time(), 0);
    }

    #[test]
    fn test_microseconds_combines_counter() {
        let kernel = kernel();
        for _ in 0..3 {
            kernel.heartbeat();
        }

        kernel.port().set_counter(7999);
        assert_eq!(kernel.microseconds(), 3_000);

        // Half way through the millisecond
        kernel.port().set_counter(3999);
        assert_eq!(kernel.microseconds(), 3_500);

        kernel.port().set_counter(0);
        assert_eq!(kernel.microseconds(), 3_999);
    }

    #[test]
    fn test_delay_zero_returns_immediately() {
        kernel().delay(0);
    }

    #[test]
    fn test_micro_delay_consumes_counter_cycles() {
        let kernel = kernel();
        kernel.port().set_step(500);
        kernel.port().set_counter(1000);

        // 250 us at 8 cycles/us is 2000 cycles, i.e. the counter must have
        // wrapped through reload at least once
        kernel.micro_delay(250);

        let counter = kernel.port().peek_counter();
        assert!(counter > 1000);
    }

    #[test]
    fn test_micro_delay_zero_returns_immediately() {
        let kernel = kernel();
        kernel.port().set_step(0);
        kernel.micro_delay(0);
    }
}
