//! CPU fault classes
//!
//! Faults are not recoverable. Board fault vectors report them through
//! [`Kernel::fault`](crate::Kernel::fault), which logs and halts.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultKind {
    #[error("Hard fault")]
    HardFault,

    #[error("Memory management fault")]
    MemManage,

    #[error("Bus fault")]
    BusFault,

    #[error("Usage fault")]
    UsageFault,

    #[error("Debug monitor trap")]
    DebugMonitor,
}
