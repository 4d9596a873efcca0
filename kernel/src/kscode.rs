//! Key-scan codes
//!
//! Cheap pseudo-random bytes for input debouncing and session keys. Each
//! sample mixes the running tick-timer counter into the last two samples, so
//! the sequence depends on when in the millisecond the caller asks.
//! An LCG term is folded in as well, keeping the sequence moving while the
//! counter is frozen (tick halted, or a simulated port).
//!
//! Not suitable for anything cryptographic.

use crate::kernel::Kernel;
use crate::port::Port;

/// LCG constants from Numerical Recipes
const LCG_MUL: u32 = 1_664_525;
const LCG_INC: u32 = 1_013_904_223;

/// Mixer state: the last two samples plus the LCG accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KsState {
    k0: u32,
    k1: u32,
    lcg: u32,
}

impl KsState {
    pub const SEED: Self = Self {
        k0: 1,
        k1: 1,
        lcg: 1,
    };

    /// Next byte given the current hardware counter value
    pub fn next(&mut self, counter: u32) -> u8 {
        self.lcg = self.lcg.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        // Odd sample keeps the product from collapsing to zero for good
        let k2 = (counter ^ self.lcg) | 1;

        let sample = self.k0.wrapping_mul(self.k1).wrapping_mul(k2) as u8;
        self.k0 = self.k1;
        self.k1 = k2;
        sample
    }
}

impl Default for KsState {
    fn default() -> Self {
        Self::SEED
    }
}

impl<P: Port> Kernel<'_, P> {
    /// One raw pseudo-random byte, any value
    pub fn random_number(&self) -> u8 {
        let counter = self.port.tick_counter();
        critical_section::with(|cs| {
            let mut state = self.ks.borrow(cs).get();
            let sample = state.next(counter);
            self.ks.borrow(cs).set(state);
            sample
        })
    }

    /// Pseudo-random code in `1..=254`
    pub fn ks_code(&self) -> u8 {
        loop {
            let code = self.random_number();
            if code != 0x00 && code != 0xFF {
                return code;
            }
        }
    }
}
