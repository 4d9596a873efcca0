//! Service table
//!
//! Numbered kernel services reachable from user context. On target the board
//! traps into the kernel (supervisor call) with a [`ServiceNumber`] and
//! register arguments, rebuilds a [`ServiceCall`] and hands it to
//! [`Kernel::service`]. Host code and the SDK call `service` directly.
//!
//! Arguments travel by value, replies come back as a [`ServiceReply`].

use core::sync::atomic::AtomicBool;

use crate::component::ComponentRef;
use crate::error::{KernelError, Result};
use crate::kernel::Kernel;
use crate::message::Message;
use crate::port::Port;
use crate::vector::Vector;

/// Service numbers, as encoded in the trap instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServiceNumber {
    RelocateVectors = 0,
    IncludeComponent = 1,
    ExcludeComponent = 2,
    InstallCallback = 3,
    FindComponent = 4,
    GetCallback = 5,
    GetSystemTime = 6,
    InstallTimeout = 7,
    GetKsCode = 8,
    GetCallbackVector = 9,
    ThrowMessage = 10,
    ThrowException = 11,
    Microseconds = 12,
    Delay = 13,
    MicroDelay = 14,
}

impl TryFrom<u8> for ServiceNumber {
    type Error = KernelError;

    fn try_from(raw: u8) -> Result<Self> {
        Ok(match raw {
            0 => Self::RelocateVectors,
            1 => Self::IncludeComponent,
            2 => Self::ExcludeComponent,
            3 => Self::InstallCallback,
            4 => Self::FindComponent,
            5 => Self::GetCallback,
            6 => Self::GetSystemTime,
            7 => Self::InstallTimeout,
            8 => Self::GetKsCode,
            9 => Self::GetCallbackVector,
            10 => Self::ThrowMessage,
            11 => Self::ThrowException,
            12 => Self::Microseconds,
            13 => Self::Delay,
            14 => Self::MicroDelay,
            other => return Err(KernelError::UnknownService(other)),
        })
    }
}

/// A service request with its arguments
#[derive(Clone, Copy)]
pub enum ServiceCall<'a> {
    RelocateVectors,
    IncludeComponent(ComponentRef<'a>),
    ExcludeComponent(ComponentRef<'a>),
    InstallCallback(ComponentRef<'a>, Vector),
    FindComponent(ComponentRef<'a>),
    GetCallback(Vector),
    GetSystemTime,
    InstallTimeout(&'a AtomicBool, u32),
    GetKsCode,
    GetCallbackVector(ComponentRef<'a>),
    ThrowMessage(Message),
    ThrowException(u32),
    Microseconds,
    Delay(u32),
    MicroDelay(u32),
}

impl ServiceCall<'_> {
    pub fn number(&self) -> ServiceNumber {
        match self {
            Self::RelocateVectors => ServiceNumber::RelocateVectors,
            Self::IncludeComponent(_) => ServiceNumber::IncludeComponent,
            Self::ExcludeComponent(_) => ServiceNumber::ExcludeComponent,
            Self::InstallCallback(..) => ServiceNumber::InstallCallback,
            Self::FindComponent(_) => ServiceNumber::FindComponent,
            Self::GetCallback(_) => ServiceNumber::GetCallback,
            Self::GetSystemTime => ServiceNumber::GetSystemTime,
            Self::InstallTimeout(..) => ServiceNumber::InstallTimeout,
            Self::GetKsCode => ServiceNumber::GetKsCode,
            Self::GetCallbackVector(_) => ServiceNumber::GetCallbackVector,
            Self::ThrowMessage(_) => ServiceNumber::ThrowMessage,
            Self::ThrowException(_) => ServiceNumber::ThrowException,
            Self::Microseconds => ServiceNumber::Microseconds,
            Self::Delay(_) => ServiceNumber::Delay,
            Self::MicroDelay(_) => ServiceNumber::MicroDelay,
        }
    }
}

impl core::fmt::Debug for ServiceCall<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ServiceCall({:?})", self.number())
    }
}

/// Result of a completed service
#[derive(Clone, Copy)]
pub enum ServiceReply<'a> {
    /// Service done, nothing to report
    Done,
    /// `FindComponent`
    Status(bool),
    /// `InstallCallback` (previous owner) and `GetCallback` (current owner)
    Component(Option<ComponentRef<'a>>),
    /// `GetSystemTime` (ms) and `Microseconds` (us)
    Time(u32),
    /// `GetKsCode`
    Code(u8),
    /// `GetCallbackVector`
    Vector(Option<Vector>),
}

impl core::fmt::Debug for ServiceReply<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Done => f.write_str("Done"),
            Self::Status(found) => write!(f, "Status({})", found),
            Self::Component(Some(_)) => f.write_str("Component(Some)"),
            Self::Component(None) => f.write_str("Component(None)"),
            Self::Time(value) => write!(f, "Time({})", value),
            Self::Code(code) => write!(f, "Code({:#04x})", code),
            Self::Vector(vector) => write!(f, "Vector({:?})", vector),
        }
    }
}

impl<'a, P: Port> Kernel<'a, P> {
    /// Execute one service request
    ///
    /// # Errors
    /// Registry and timeout-pool failures from the underlying operation
    pub fn service(&self, call: ServiceCall<'a>) -> Result<ServiceReply<'a>> {
        log::trace!("{:?}", call);

        let reply = match call {
            ServiceCall::RelocateVectors => {
                self.port.relocate_vectors();
                ServiceReply::Done
            }
            ServiceCall::IncludeComponent(component) => {
                self.include_component(component)?;
                ServiceReply::Done
            }
            ServiceCall::ExcludeComponent(component) => {
                self.exclude_component(component)?;
                ServiceReply::Done
            }
            ServiceCall::InstallCallback(component, vector) => {
                ServiceReply::Component(self.install_callback(component, vector))
            }
            ServiceCall::FindComponent(component) => {
                ServiceReply::Status(self.find_component(component))
            }
            ServiceCall::GetCallback(vector) => ServiceReply::Component(self.get_callback(vector)),
            ServiceCall::GetSystemTime => ServiceReply::Time(self.system_time()),
            ServiceCall::InstallTimeout(flag, delay_ms) => {
                self.install_timeout(flag, delay_ms)?;
                ServiceReply::Done
            }
            ServiceCall::GetKsCode => ServiceReply::Code(self.ks_code()),
            ServiceCall::GetCallbackVector(component) => {
                ServiceReply::Vector(self.get_callback_vector(component))
            }
            ServiceCall::ThrowMessage(message) => {
                self.dispatch(message);
                ServiceReply::Done
            }
            ServiceCall::ThrowException(code) => {
                self.throw_exception(code);
                ServiceReply::Done
            }
            ServiceCall::Microseconds => ServiceReply::Time(self.microseconds()),
            ServiceCall::Delay(ms) => {
                self.delay(ms);
                ServiceReply::Done
            }
            ServiceCall::MicroDelay(us) => {
                self.micro_delay(us);
                ServiceReply::Done
            }
        };

        Ok(reply)
    }
}
