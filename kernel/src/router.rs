//! Priority router
//!
//! Entry point for hardware-origin messages. The owner of the vector named by
//! `data1` decides how the message travels:
//!
//! - `TimeCritical`: `interrupt_callback` runs right here, in the caller's
//!   interrupt context
//! - `Normal`: queued for the deferred-callback context, or run right here
//!   when the system sleeps
//! - `Background`: queued in the message pipe for the next main-loop pass
//!
//! A reply from a callback that ran here is dropped. Only the deferred
//! context hands replies back to the router, so a component echoing its own
//! message can never pin the interrupt that raised it.

use crate::component::{follow_up, ComponentRef, Priority};
use crate::kernel::Kernel;
use crate::message::Message;
use crate::port::Port;

impl<P: Port> Kernel<'_, P> {
    /// Route a hardware-origin message to its vector's owner
    ///
    /// Null messages, unknown vectors and unowned vectors are discarded.
    pub fn dispatch(&self, message: Message) {
        if message.is_null() {
            return;
        }

        let Some(vector) = message.vector() else {
            log::trace!("Discarding {:?}: unknown vector {}", message.kind, message.data1);
            return;
        };
        let Some(owner) = self.get_callback(vector) else {
            log::trace!("Discarding {:?}: {:?} has no owner", message.kind, vector);
            return;
        };

        match owner.priority() {
            Priority::TimeCritical => Self::call_now(owner, &message),
            Priority::Normal if self.is_sleeping() => Self::call_now(owner, &message),
            Priority::Normal => {
                if let Err(err) = self.schedule_callback(message) {
                    log::warn!("Dropping {:?} from {:?}: {}", message.kind, vector, err);
                }
            }
            Priority::Background => {
                if let Err(err) = self.pipe.insert(message) {
                    log::warn!("Dropping {:?} from {:?}: {}", message.kind, vector, err);
                }
            }
        }
    }

    fn call_now(owner: ComponentRef<'_>, message: &Message) {
        if let Some(reply) = follow_up(owner.interrupt_callback(message)) {
            log::trace!("Ignoring {:?} returned for {:?}", reply.kind, message.kind);
        }
    }
}
