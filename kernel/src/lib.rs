//! Pulse Kernel - event-driven cooperative dispatcher
//!
//! # Purpose
//! Turns hardware interrupts into typed [`Message`]s, routes them to registered
//! [`Component`]s by priority class and drives periodic housekeeping (time
//! ticks, input scan, output repaint) from a single 1 ms hardware tick.
//!
//! # Integration Points
//! - Depends on: a board [`Port`] (tick timer, deferred exception, low-power wait)
//! - Provides to: peripheral IRQ translators, application components, `pulse-sdk`
//! - Entry points: [`KernelHandle::on_tick`], [`KernelHandle::on_deferred`],
//!   [`KernelHandle::on_interrupt`], [`KernelHandle::on_service`]
//!
//! # Architecture
//! Three execution levels, strictly ordered by the interrupt controller:
//! 1. Hardware interrupt handlers (call [`Kernel::dispatch`])
//! 2. The deferred-callback context (runs [`Kernel::service_callbacks`])
//! 3. The main loop ([`Kernel::execute`]) draining the [`MessagePipe`]
//!
//! Every shared table is touched only inside a short critical section covering
//! one queue or table operation. Component code always runs outside of them,
//! so a component may call back into the kernel from `notify` or
//! `interrupt_callback`.
//!
//! Nothing here allocates: queues, registry, vector table and timeout pool are
//! fixed-capacity arrays sized in [`config`].
//!
//! # Testing Strategy
//! - Unit tests: every module, against [`port::sim::SimPort`]
//! - Integration tests: `tests/` (routing, heartbeat scenarios, service table)
//! - Benchmarks: `benches/dispatch.rs`

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod component;
pub mod config;
pub mod error;
pub mod fault;
pub mod fifo;
pub mod handle;
pub mod heartbeat;
pub mod kernel;
pub mod kscode;
pub mod message;
pub mod pipe;
pub mod port;
pub mod registry;
pub mod signal;
pub mod svc;
pub mod vector;

mod clock;
mod deferred;
mod router;

pub use component::{Component, ComponentRef, Priority};
pub use config::KernelConfig;
pub use error::{KernelError, Result};
pub use fault::FaultKind;
pub use fifo::Fifo;
pub use handle::KernelHandle;
pub use heartbeat::RateCounters;
pub use kernel::{AppHooks, Kernel, KernelFlags};
pub use kscode::KsState;
pub use message::{Message, MessageKind};
pub use pipe::MessagePipe;
pub use port::Port;
pub use registry::Registry;
pub use signal::TimeoutTable;
pub use svc::{ServiceCall, ServiceNumber, ServiceReply};
pub use vector::{Vector, VectorTable};
