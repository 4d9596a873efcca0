//! Heartbeat
//!
//! The 1 ms tick handler. Every call advances the system clock, counts down
//! the timeout table and steps three rate counters that emit the periodic
//! system messages into the pipe:
//!
//! | counter | message     | start phase | rate field    |
//! |---------|-------------|-------------|---------------|
//! | time    | `TIME_TICK` | 1           | `tick_rate`   |
//! | input   | `KEY_SCAN`  | 2           | `scan_rate`   |
//! | output  | `REPAINT`   | 3           | `update_rate` |
//!
//! The staggered start phases keep the three from landing on the same tick
//! when their rates share a factor.

use core::sync::atomic::Ordering;

use crate::config::KernelConfig;
use crate::kernel::Kernel;
use crate::message::{Message, MessageKind};
use crate::port::Port;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCounters {
    time: u32,
    input: u32,
    output: u32,
}

impl RateCounters {
    pub const START: Self = Self {
        time: 1,
        input: 2,
        output: 3,
    };

    /// Advance all three counters by one tick
    ///
    /// Returns the messages due this tick, in time/input/output order.
    pub fn advance(&mut self, config: &KernelConfig, now: u32) -> [Option<Message>; 3] {
        [
            Self::step(&mut self.time, config.tick_rate)
                .then(|| Message::new(MessageKind::TIME_TICK, 0, now)),
            Self::step(&mut self.input, config.scan_rate)
                .then(|| Message::new(MessageKind::KEY_SCAN, 0, 0)),
            Self::step(&mut self.output, config.update_rate)
                .then(|| Message::new(MessageKind::REPAINT, 0, 0)),
        ]
    }

    fn step(counter: &mut u32, rate: u16) -> bool {
        if rate == 0 {
            return false;
        }

        *counter += 1;
        if *counter > u32::from(rate) {
            *counter = 1;
            true
        } else {
            false
        }
    }
}

impl Default for RateCounters {
    fn default() -> Self {
        Self::START
    }
}

impl<P: Port> Kernel<'_, P> {
    /// Tick handler, to be called once per millisecond from the tick interrupt
    pub fn heartbeat(&self) {
        // Only writer of the clock; a plain load/store pair keeps this usable
        // on cores without atomic read-modify-write
        let now = self.time.load(Ordering::Relaxed).wrapping_add(1);
        self.time.store(now, Ordering::Release);

        let (fired, due) = critical_section::with(|cs| {
            let fired = self.timeouts.borrow_ref_mut(cs).update();

            let mut counters = self.counters.borrow(cs).get();
            let due = counters.advance(&self.config, now);
            self.counters.borrow(cs).set(counters);

            (fired, due)
        });

        if fired > 0 {
            log::trace!("{} timeout(s) expired at {} ms", fired, now);
        }

        for message in due.into_iter().flatten() {
            if let Err(err) = self.pipe.insert(message) {
                log::warn!("Heartbeat dropped {:?} at {} ms: {}", message.kind, now, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tick: u16, scan: u16, update: u16) -> KernelConfig {
        KernelConfig {
            tick_rate: tick,
            scan_rate: scan,
            update_rate: update,
            ..KernelConfig::DEFAULT
        }
    }

    /// Ticks (1-based) on which each counter emitted
    fn schedule(config: &KernelConfig, ticks: u32) -> [std::vec::Vec<u32>; 3] {
        let mut counters = RateCounters::START;
        let mut emitted: [std::vec::Vec<u32>; 3] = Default::default();

        for now in 1..=ticks {
            for (slot, due) in counters.advance(config, now).iter().enumerate() {
                if due.is_some() {
                    emitted[slot].push(now);
                }
            }
        }
        emitted
    }

    #[test]
    fn test_default_rates_phase() {
        let [time, input, output] = schedule(&config(1, 10, 20), 40);

        assert_eq!(time.len(), 40);
        assert_eq!(input, vec![9, 19, 29, 39]);
        assert_eq!(output, vec![18, 38]);
    }

    #[test]
    fn test_zero_rate_disables() {
        let [time, input, output] = schedule(&config(0, 0, 2), 10);

        assert!(time.is_empty());
        assert!(input.is_empty());
        // Starts at phase 3, already above rate 2 after the first increment
        assert_eq!(output, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_time_tick_carries_clock() {
        let mut counters = RateCounters::START;
        let config = config(1, 0, 0);

        let [tick, _, _] = counters.advance(&config, 1234);
        let tick = tick.unwrap();
        assert_eq!(tick.kind, MessageKind::TIME_TICK);
        assert_eq!(tick.data2, 1234);
    }
}
