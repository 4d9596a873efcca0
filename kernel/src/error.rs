//! Kernel error types
//!
//! Every failure the dispatch core reports is recoverable by the caller:
//! capacity exhaustion, missing registrations and malformed service requests.
//! Fatal CPU faults never surface here, see [`crate::fault`].

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("Queue full (capacity: {capacity})")]
    QueueFull { capacity: usize },

    #[error("Component registry full (capacity: {capacity})")]
    RegistryFull { capacity: usize },

    #[error("Component already registered")]
    AlreadyRegistered,

    #[error("Component not found")]
    ComponentNotFound,

    #[error("No free timeout slot ({slots} in use)")]
    TimeoutPoolExhausted { slots: usize },

    #[error("Unknown interrupt vector {0}")]
    UnknownVector(u32),

    #[error("Unknown service number {0}")]
    UnknownService(u8),

    #[error("Kernel handle already installed")]
    AlreadyInstalled,

    #[error("Kernel handle not installed")]
    NotInstalled,
}

pub type Result<T> = core::result::Result<T, KernelError>;
