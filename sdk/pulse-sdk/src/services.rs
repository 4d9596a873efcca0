//! Typed service wrappers
//!
//! [`Services`] turns every service table entry into an ordinary method with
//! typed arguments and results. Kernel failures come back as [`Error`].

use core::sync::atomic::AtomicBool;

use pulse_kernel::{ComponentRef, Message, ServiceCall, ServiceReply, Vector};

use crate::gate::Gate;
use crate::{Error, Result};

pub struct Services<'g, G> {
    gate: &'g G,
}

impl<'g, 'a, G: Gate<'a>> Services<'g, G> {
    pub fn new(gate: &'g G) -> Self {
        Self { gate }
    }

    fn call(&self, call: ServiceCall<'a>) -> Result<ServiceReply<'a>> {
        Ok(self.gate.call(call)?)
    }

    fn done(&self, call: ServiceCall<'a>) -> Result<()> {
        match self.call(call)? {
            ServiceReply::Done => Ok(()),
            other => Self::unexpected(call, other),
        }
    }

    fn unexpected<T>(call: ServiceCall<'a>, reply: ServiceReply<'a>) -> Result<T> {
        log::warn!("{:?} answered with {:?}", call, reply);
        Err(Error::UnexpectedReply)
    }

    pub fn relocate_vectors(&self) -> Result<()> {
        self.done(ServiceCall::RelocateVectors)
    }

    /// Join the broadcast list
    pub fn include_component(&self, component: ComponentRef<'a>) -> Result<()> {
        self.done(ServiceCall::IncludeComponent(component))
    }

    /// Leave the broadcast list
    pub fn exclude_component(&self, component: ComponentRef<'a>) -> Result<()> {
        self.done(ServiceCall::ExcludeComponent(component))
    }

    /// Take ownership of `vector`, returning the owner it had
    ///
    /// A driver replacing another should keep the returned handle and chain
    /// to it from its own callback.
    pub fn install_callback(
        &self,
        component: ComponentRef<'a>,
        vector: Vector,
    ) -> Result<Option<ComponentRef<'a>>> {
        let call = ServiceCall::InstallCallback(component, vector);
        match self.call(call)? {
            ServiceReply::Component(previous) => Ok(previous),
            other => Self::unexpected(call, other),
        }
    }

    pub fn find_component(&self, component: ComponentRef<'a>) -> Result<bool> {
        let call = ServiceCall::FindComponent(component);
        match self.call(call)? {
            ServiceReply::Status(found) => Ok(found),
            other => Self::unexpected(call, other),
        }
    }

    pub fn get_callback(&self, vector: Vector) -> Result<Option<ComponentRef<'a>>> {
        let call = ServiceCall::GetCallback(vector);
        match self.call(call)? {
            ServiceReply::Component(owner) => Ok(owner),
            other => Self::unexpected(call, other),
        }
    }

    /// Milliseconds since start-up
    pub fn system_time(&self) -> Result<u32> {
        let call = ServiceCall::GetSystemTime;
        match self.call(call)? {
            ServiceReply::Time(ms) => Ok(ms),
            other => Self::unexpected(call, other),
        }
    }

    /// Raise `flag` after `delay_ms` milliseconds (clamped to 1..=10000)
    pub fn install_timeout(&self, flag: &'a AtomicBool, delay_ms: u32) -> Result<()> {
        self.done(ServiceCall::InstallTimeout(flag, delay_ms))
    }

    /// Pseudo-random code in `1..=254`
    pub fn ks_code(&self) -> Result<u8> {
        let call = ServiceCall::GetKsCode;
        match self.call(call)? {
            ServiceReply::Code(code) => Ok(code),
            other => Self::unexpected(call, other),
        }
    }

    pub fn callback_vector(&self, component: ComponentRef<'a>) -> Result<Option<Vector>> {
        let call = ServiceCall::GetCallbackVector(component);
        match self.call(call)? {
            ServiceReply::Vector(vector) => Ok(vector),
            other => Self::unexpected(call, other),
        }
    }

    /// Inject `message` as if an interrupt had produced it
    pub fn throw_message(&self, message: Message) -> Result<()> {
        self.done(ServiceCall::ThrowMessage(message))
    }

    pub fn throw_exception(&self, code: u32) -> Result<()> {
        self.done(ServiceCall::ThrowException(code))
    }

    pub fn microseconds(&self) -> Result<u32> {
        let call = ServiceCall::Microseconds;
        match self.call(call)? {
            ServiceReply::Time(us) => Ok(us),
            other => Self::unexpected(call, other),
        }
    }

    /// Busy-wait; the tick must be running
    pub fn delay(&self, ms: u32) -> Result<()> {
        self.done(ServiceCall::Delay(ms))
    }

    /// Busy-wait on the tick counter; the tick must be running
    pub fn micro_delay(&self, us: u32) -> Result<()> {
        self.done(ServiceCall::MicroDelay(us))
    }
}
