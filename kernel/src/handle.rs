//! Global kernel handle
//!
//! Interrupt vectors are plain `extern "C" fn()`s with no way to receive
//! arguments, so a board keeps one `static KernelHandle` and points it at its
//! `static Kernel` once during start-up:
//!
//! ```
//! use pulse_kernel::port::sim::SimPort;
//! use pulse_kernel::{AppHooks, Kernel, KernelConfig, KernelHandle};
//!
//! static KERNEL: Kernel<'static, SimPort> =
//!     Kernel::new(SimPort::new(), KernelConfig::DEFAULT, AppHooks::NONE);
//! static HANDLE: KernelHandle<SimPort> = KernelHandle::new();
//!
//! HANDLE.install(&KERNEL).unwrap();
//!
//! // Tick vector
//! HANDLE.on_tick();
//! assert_eq!(KERNEL.system_time(), 1);
//! ```
//!
//! Entry points called before `install` do nothing (faults still halt).

use spin::Once;

use crate::error::{KernelError, Result};
use crate::fault::FaultKind;
use crate::kernel::Kernel;
use crate::message::Message;
use crate::port::Port;
use crate::svc::{ServiceCall, ServiceReply};

pub struct KernelHandle<P: Port + 'static> {
    kernel: Once<&'static Kernel<'static, P>>,
}

impl<P: Port + 'static> KernelHandle<P> {
    pub const fn new() -> Self {
        Self { kernel: Once::new() }
    }

    /// Bind the handle to `kernel`; only the first call succeeds
    ///
    /// # Errors
    /// `AlreadyInstalled` on every later call
    pub fn install(&self, kernel: &'static Kernel<'static, P>) -> Result<()> {
        let mut fresh = false;
        self.kernel.call_once(|| {
            fresh = true;
            kernel
        });

        if fresh {
            Ok(())
        } else {
            Err(KernelError::AlreadyInstalled)
        }
    }

    pub fn get(&self) -> Option<&'static Kernel<'static, P>> {
        self.kernel.get().copied()
    }

    /// Tick vector body
    pub fn on_tick(&self) {
        if let Some(kernel) = self.get() {
            kernel.heartbeat();
        }
    }

    /// Deferred-callback vector body
    pub fn on_deferred(&self) {
        if let Some(kernel) = self.get() {
            kernel.service_callbacks();
        }
    }

    /// Peripheral vector body, after the translator built `message`
    pub fn on_interrupt(&self, message: Message) {
        if let Some(kernel) = self.get() {
            kernel.dispatch(message);
        }
    }

    /// Service trap body
    ///
    /// # Errors
    /// `NotInstalled`, or whatever the service reports
    pub fn on_service(&self, call: ServiceCall<'static>) -> Result<ServiceReply<'static>> {
        self.get().ok_or(KernelError::NotInstalled)?.service(call)
    }

    /// Fault vector body
    pub fn on_fault(&self, kind: FaultKind) -> ! {
        match self.get() {
            Some(kernel) => kernel.fault(kind),
            None => loop {
                core::hint::spin_loop();
            },
        }
    }
}

impl<P: Port + 'static> Default for KernelHandle<P> {
    fn default() -> Self {
        Self::new()
    }
}
