//! Board support seam
//!
//! The kernel never touches hardware registers itself. Everything it needs
//! from the chip goes through [`Port`]: the 1 ms tick timer, the software
//! pended deferred exception, the low-power wait and a few boot-time hooks.
//!
//! A board crate implements `Port` over its register blocks; host tests and
//! benchmarks use [`sim::SimPort`].

#[cfg(target_has_atomic = "32")]
pub mod sim;

/// Hardware operations the kernel relies on
///
/// Every method may be called from interrupt context.
pub trait Port: Sync {
    /// Program the tick timer with `reload` (counts `reload..=0`)
    fn configure_tick(&self, reload: u32);

    /// Unmask the tick interrupt
    fn enable_tick(&self);

    /// Mask the tick interrupt; the counter may keep running
    fn disable_tick(&self);

    /// Current value of the down-counting tick timer
    fn tick_counter(&self) -> u32;

    /// Reload value the tick timer restarts from
    fn tick_reload(&self) -> u32;

    /// Request the deferred-callback exception
    fn pend_deferred(&self);

    /// Withdraw a pending deferred-callback request
    fn clear_deferred(&self);

    /// Sleep until the next interrupt
    fn wait_for_interrupt(&self);

    /// Return to sleep automatically after each handler completes
    fn set_sleep_on_exit(&self, enabled: bool);

    /// Select deep sleep for the next low-power wait
    fn set_deep_sleep(&self, enabled: bool);

    /// Restart the watchdog countdown
    fn kick_watchdog(&self);

    /// Point the CPU at the application's vector table
    fn relocate_vectors(&self);

    /// Stop the CPU for good
    fn halt(&self) -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}
