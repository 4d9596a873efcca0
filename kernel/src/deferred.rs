//! Deferred-callback context
//!
//! `Normal` priority interrupt callbacks are parked in a small queue by the
//! router and run from a software-pended, low-priority exception. The board
//! wires that exception to [`Kernel::service_callbacks`].

use crate::component::follow_up;
use crate::error::Result;
use crate::kernel::Kernel;
use crate::message::Message;
use crate::port::Port;

impl<P: Port> Kernel<'_, P> {
    /// Queue `message` for the deferred context and pend it
    ///
    /// # Errors
    /// `QueueFull` when the callback queue is full; nothing is pended then
    pub fn schedule_callback(&self, message: Message) -> Result<()> {
        critical_section::with(|cs| self.callbacks.borrow_ref_mut(cs).put(message))?;
        self.port.pend_deferred();
        Ok(())
    }

    /// Next parked message, if any
    pub fn attend_callback(&self) -> Option<Message> {
        critical_section::with(|cs| self.callbacks.borrow_ref_mut(cs).get())
    }

    /// Withdraw any deferred request raised while the queue was being drained
    pub fn callbacks_attended(&self) {
        self.port.clear_deferred();
    }

    /// Deferred exception body: run every parked callback
    ///
    /// Follow-ups go back through [`Kernel::dispatch`]. Returns the number of
    /// messages taken from the queue.
    pub fn service_callbacks(&self) -> u32 {
        let mut serviced = 0u32;

        while let Some(message) = self.attend_callback() {
            serviced = serviced.wrapping_add(1);

            let Some(owner) = message.vector().and_then(|vector| self.get_callback(vector)) else {
                log::trace!("Deferred {:?} lost its owner", message.kind);
                continue;
            };

            if let Some(reply) = follow_up(owner.interrupt_callback(&message)) {
                self.dispatch(reply);
            }
        }

        self.callbacks_attended();
        serviced
    }
}
