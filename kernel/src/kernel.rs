//! Kernel instance
//!
//! [`Kernel`] owns every piece of dispatcher state: the message pipe, the
//! vector table, the timeout pool, the pending-callback queue, the clock and
//! the state flags. It is built with a `const fn` so a board can keep it in a
//! `static` and reach it from interrupt vectors through a
//! [`KernelHandle`](crate::KernelHandle).
//!
//! Operations are spread over several modules by concern:
//! - routing: [`Kernel::dispatch`] (`router.rs`)
//! - deferred callbacks: [`Kernel::service_callbacks`] (`deferred.rs`)
//! - tick handling: [`Kernel::heartbeat`] (`heartbeat.rs`)
//! - time and busy waits: [`Kernel::microseconds`], [`Kernel::delay`] (`clock.rs`)
//! - service table: [`Kernel::service`] (`svc.rs`)
//!
//! This module holds construction, lifecycle, power control and the
//! component/vector bookkeeping.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use bitflags::bitflags;
use critical_section::Mutex;

use crate::component::ComponentRef;
use crate::config::{KernelConfig, STANDARD_CALLBACKS};
use crate::error::Result;
use crate::fault::FaultKind;
use crate::fifo::Fifo;
use crate::heartbeat::RateCounters;
use crate::kscode::KsState;
use crate::message::Message;
use crate::pipe::MessagePipe;
use crate::port::Port;
use crate::signal::TimeoutTable;
use crate::vector::{Vector, VectorTable};

bitflags! {
    /// Kernel run state
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KernelFlags: u8 {
        /// Tick interrupt disabled by `halt`
        const HALTED   = 1 << 0;
        /// Low-power wait between main-loop passes
        const SLEEPING = 1 << 1;
    }
}

/// Optional application entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppHooks {
    /// Runs once from `start`, after initialization and before the main loop
    pub start: Option<fn()>,
    /// Receives codes raised with `throw_exception`
    pub exception: Option<fn(u32)>,
}

impl AppHooks {
    pub const NONE: Self = Self {
        start: None,
        exception: None,
    };
}

pub struct Kernel<'a, P: Port> {
    pub(crate) port: P,
    pub(crate) config: KernelConfig,
    pub(crate) hooks: AppHooks,
    pub(crate) flags: AtomicU8,
    pub(crate) time: AtomicU32,
    pub(crate) pipe: MessagePipe<'a>,
    pub(crate) vectors: Mutex<RefCell<VectorTable<'a>>>,
    pub(crate) timeouts: Mutex<RefCell<TimeoutTable<'a>>>,
    pub(crate) callbacks: Mutex<RefCell<Fifo<Message, STANDARD_CALLBACKS>>>,
    pub(crate) counters: Mutex<Cell<RateCounters>>,
    pub(crate) ks: Mutex<Cell<KsState>>,
}

impl<'a, P: Port> Kernel<'a, P> {
    pub const fn new(port: P, config: KernelConfig, hooks: AppHooks) -> Self {
        Self {
            port,
            config,
            hooks,
            flags: AtomicU8::new(0),
            time: AtomicU32::new(0),
            pipe: MessagePipe::new(),
            vectors: Mutex::new(RefCell::new(VectorTable::new())),
            timeouts: Mutex::new(RefCell::new(TimeoutTable::new())),
            callbacks: Mutex::new(RefCell::new(Fifo::new(Message::NULL))),
            counters: Mutex::new(Cell::new(RateCounters::START)),
            ks: Mutex::new(Cell::new(KsState::SEED)),
        }
    }

    /// Return every table, counter and flag to its power-on state
    ///
    /// Registered components, vector owners and armed timeouts are all
    /// forgotten.
    pub fn initialize(&self) {
        critical_section::with(|cs| {
            self.vectors.borrow_ref_mut(cs).clear();
            self.timeouts.borrow_ref_mut(cs).clear();
            self.callbacks.borrow_ref_mut(cs).clear();
            self.counters.borrow(cs).set(RateCounters::START);
            self.ks.borrow(cs).set(KsState::SEED);
        });
        self.pipe.reset();
        self.time.store(0, Ordering::Release);
        self.flags.store(KernelFlags::empty().bits(), Ordering::Release);

        #[cfg(feature = "deep-sleep")]
        self.port.set_deep_sleep(true);

        log::debug!("Kernel initialized: {:?}", self.config);
    }

    /// Boot sequence; never returns
    ///
    /// Relocates the vector table, initializes, starts the 1 ms tick, runs
    /// the application start hook and enters the main loop.
    pub fn start(&self) -> ! {
        self.port.relocate_vectors();
        self.initialize();

        let reload = self.config.tick_reload();
        self.port.configure_tick(reload);
        self.port.enable_tick();
        log::debug!("Tick running, reload {}", reload);

        if let Some(start) = self.hooks.start {
            start();
        }

        self.execute()
    }

    /// Main loop; never returns
    pub fn execute(&self) -> ! {
        loop {
            self.run_once();
        }
    }

    /// One main-loop pass: kick the watchdog, drain the pipe, then wait for
    /// the next interrupt if sleeping
    ///
    /// Returns the number of messages broadcast.
    pub fn run_once(&self) -> u32 {
        self.port.kick_watchdog();
        let drained = self.pipe.dispatch();

        if self.is_sleeping() {
            self.port.wait_for_interrupt();
        }
        drained
    }

    // Run state

    pub fn flags(&self) -> KernelFlags {
        KernelFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    fn update_flags(&self, set: KernelFlags, value: bool) {
        critical_section::with(|_| {
            let mut flags = self.flags();
            flags.set(set, value);
            self.flags.store(flags.bits(), Ordering::Release);
        });
    }

    /// Stop the tick interrupt; the clock and timeouts freeze
    pub fn halt(&self) {
        self.update_flags(KernelFlags::HALTED, true);
        self.port.disable_tick();
        log::debug!("Kernel halted at {} ms", self.system_time());
    }

    pub fn resume(&self) {
        self.update_flags(KernelFlags::HALTED, false);
        self.port.enable_tick();
        log::debug!("Kernel resumed at {} ms", self.system_time());
    }

    pub fn is_halted(&self) -> bool {
        self.flags().contains(KernelFlags::HALTED)
    }

    /// Enter or leave low-power mode
    ///
    /// While sleeping the main loop waits for an interrupt after every pass
    /// and `Normal` callbacks run straight from the interrupt that raised
    /// them.
    pub fn sleep(&self, enabled: bool) {
        self.port.set_sleep_on_exit(enabled);
        self.update_flags(KernelFlags::SLEEPING, enabled);
        log::debug!("Sleep {}", if enabled { "on" } else { "off" });
    }

    pub fn is_sleeping(&self) -> bool {
        self.flags().contains(KernelFlags::SLEEPING)
    }

    // Components

    /// Add `component` to the broadcast list
    ///
    /// # Errors
    /// `RegistryFull` or `AlreadyRegistered`
    pub fn include_component(&self, component: ComponentRef<'a>) -> Result<()> {
        self.pipe.include_component(component)?;
        log::debug!("Component included ({} registered)", self.pipe.components());
        Ok(())
    }

    /// Remove `component` from the broadcast list; vector ownership is kept
    ///
    /// # Errors
    /// `ComponentNotFound`
    pub fn exclude_component(&self, component: ComponentRef<'_>) -> Result<()> {
        self.pipe.exclude_component(component)?;
        log::debug!("Component excluded ({} registered)", self.pipe.components());
        Ok(())
    }

    pub fn find_component(&self, component: ComponentRef<'_>) -> bool {
        self.pipe.find_component(component).is_some()
    }

    /// Make `component` the owner of `vector`, returning the previous owner
    pub fn install_callback(
        &self,
        component: ComponentRef<'a>,
        vector: Vector,
    ) -> Option<ComponentRef<'a>> {
        let previous =
            critical_section::with(|cs| self.vectors.borrow_ref_mut(cs).install(vector, component));
        log::debug!(
            "{:?} callback installed{}",
            vector,
            if previous.is_some() { ", replacing previous owner" } else { "" }
        );
        previous
    }

    /// Clear the owner of `vector`, returning it
    pub fn remove_callback(&self, vector: Vector) -> Option<ComponentRef<'a>> {
        critical_section::with(|cs| self.vectors.borrow_ref_mut(cs).remove(vector))
    }

    pub fn get_callback(&self, vector: Vector) -> Option<ComponentRef<'a>> {
        critical_section::with(|cs| self.vectors.borrow_ref(cs).owner(vector))
    }

    /// First vector owned by `component`
    pub fn get_callback_vector(&self, component: ComponentRef<'_>) -> Option<Vector> {
        critical_section::with(|cs| self.vectors.borrow_ref(cs).vector_of(component))
    }

    // Timeouts

    /// Raise `flag` after `delay_ms` heartbeats (clamped to 1..=10000)
    ///
    /// # Errors
    /// `TimeoutPoolExhausted`
    pub fn install_timeout(&self, flag: &'a AtomicBool, delay_ms: u32) -> Result<()> {
        critical_section::with(|cs| self.timeouts.borrow_ref_mut(cs).install(flag, delay_ms))
    }

    // Exceptions

    /// Report a recoverable application-level exception
    ///
    /// Without an exception hook the code is absorbed.
    pub fn throw_exception(&self, code: u32) {
        match self.hooks.exception {
            Some(hook) => hook(code),
            None => log::debug!("Exception {:#x} absorbed (no hook)", code),
        }
    }

    /// Unrecoverable CPU fault: log and stop for good
    pub fn fault(&self, kind: FaultKind) -> ! {
        log::error!("{} at {} ms, halting", kind, self.system_time());
        self.port.disable_tick();
        self.port.halt()
    }

    // Accessors

    pub fn pipe(&self) -> &MessagePipe<'a> {
        &self.pipe
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Messages waiting for the deferred-callback context
    pub fn pending_callbacks(&self) -> usize {
        critical_section::with(|cs| self.callbacks.borrow_ref(cs).count())
    }

    /// Armed timeout slots
    pub fn armed_timeouts(&self) -> usize {
        critical_section::with(|cs| self.timeouts.borrow_ref(cs).armed())
    }
}
