//! Component contract
//!
//! Anything that wants to hear from the kernel implements [`Component`]:
//! drivers, services and applications alike. The kernel stores components as
//! opaque [`ComponentRef`]s and never owns them.
//!
//! # Example
//! ```
//! use core::sync::atomic::{AtomicU32, Ordering};
//! use pulse_kernel::{Component, Message, MessageKind, Priority};
//!
//! struct Blinker {
//!     ticks: AtomicU32,
//! }
//!
//! impl Component for Blinker {
//!     fn priority(&self) -> Priority {
//!         Priority::Background
//!     }
//!
//!     fn notify(&self, message: &Message) -> Option<Message> {
//!         if message.kind == MessageKind::TIME_TICK {
//!             self.ticks.fetch_add(1, Ordering::Relaxed);
//!         }
//!         None
//!     }
//!
//!     fn interrupt_callback(&self, _message: &Message) -> Option<Message> {
//!         None
//!     }
//! }
//! ```

use crate::message::Message;

/// Response-urgency class a component declares for its interrupt callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Callback runs synchronously inside the originating interrupt
    TimeCritical,
    /// Callback is deferred to the low-priority deferred-exception context
    /// (or runs synchronously while the system sleeps)
    Normal,
    /// Message is broadcast through the pipe on the next main-loop pass
    Background,
}

/// Kernel-facing component interface
///
/// # Chaining
///
/// Both notifications may return a follow-up message. Returning a message
/// whose kind is `NULL` is the same as returning `None`.
/// - From `notify`, the follow-up is inserted back into the message pipe;
///   `EXTINGUISH` stops the current normal message from reaching the
///   remaining components.
/// - From `interrupt_callback`, the follow-up is handed to the router again
///   only when the callback ran in the deferred context. Replies from
///   callbacks run straight from the interrupt are dropped.
///
/// # Contexts
///
/// `notify` always runs in the main loop. `interrupt_callback` runs in
/// interrupt context for [`Priority::TimeCritical`]. For [`Priority::Normal`]
/// it runs in the deferred-exception context while the system is awake and in
/// interrupt context while it sleeps, so such callbacks must be safe in both.
///
/// # Identity
///
/// Components are compared by address. A zero-sized component type gives no
/// stable identity and must not be registered twice as distinct instances.
pub trait Component: Sync {
    /// Priority class used by the router
    fn priority(&self) -> Priority;

    /// Broadcast notification (main-loop context)
    fn notify(&self, message: &Message) -> Option<Message>;

    /// Hardware-origin notification for an owned vector
    fn interrupt_callback(&self, message: &Message) -> Option<Message>;
}

/// Borrowed handle to a registered component
pub type ComponentRef<'a> = &'a dyn Component;

/// Handle identity: the same object, regardless of vtable
pub fn same_component(a: ComponentRef<'_>, b: ComponentRef<'_>) -> bool {
    core::ptr::addr_eq(a as *const dyn Component, b as *const dyn Component)
}

/// Drop follow-ups that carry no message
pub(crate) fn follow_up(reply: Option<Message>) -> Option<Message> {
    reply.filter(|message| !message.is_null())
}
