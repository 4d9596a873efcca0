//! Pulse SDK
//!
//! Typed access to the Pulse service table for components and application
//! code.
//!
//! # Modules
//! - [`gate`]: the [`Gate`] trait, the path a service request takes into the
//!   kernel
//! - [`services`]: [`Services`], one method per service table entry
//!
//! # Example
//! ```
//! use pulse_kernel::port::sim::SimPort;
//! use pulse_kernel::{AppHooks, Kernel, KernelConfig};
//! use pulse_sdk::Services;
//!
//! let kernel = Kernel::new(SimPort::new(), KernelConfig::DEFAULT, AppHooks::NONE);
//! let services = Services::new(&kernel);
//!
//! kernel.heartbeat();
//! assert_eq!(services.system_time().unwrap(), 1);
//! ```

#![no_std]

pub mod gate;
pub mod services;

pub use gate::Gate;
pub use services::Services;

use pulse_kernel::KernelError;

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for SDK operations
pub type Result<T> = core::result::Result<T, Error>;

/// SDK error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A fixed-size kernel table or queue is full
    Exhausted,
    /// Component already registered
    AlreadyRegistered,
    /// Component not registered
    NotFound,
    /// Request named something the kernel does not know
    InvalidParameter,
    /// Kernel not reachable yet
    NotInstalled,
    /// Kernel answered with a reply of the wrong shape
    UnexpectedReply,
}

impl From<KernelError> for Error {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::QueueFull { .. }
            | KernelError::RegistryFull { .. }
            | KernelError::TimeoutPoolExhausted { .. } => Error::Exhausted,
            KernelError::AlreadyRegistered | KernelError::AlreadyInstalled => {
                Error::AlreadyRegistered
            }
            KernelError::ComponentNotFound => Error::NotFound,
            KernelError::UnknownVector(_) | KernelError::UnknownService(_) => {
                Error::InvalidParameter
            }
            KernelError::NotInstalled => Error::NotInstalled,
        }
    }
}
