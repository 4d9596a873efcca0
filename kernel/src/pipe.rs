//! Message pipe
//!
//! Two bounded queues (normal and urgent) plus the component registry. The
//! main loop drains the pipe with [`MessagePipe::dispatch`], which broadcasts
//! every queued message to every registered component in registry order.
//!
//! # Delivery rules
//! - The urgent queue is always drained completely before the normal queue
//! - A non-null follow-up returned from `notify` is inserted back into the
//!   pipe and handled in the same drain if its queue is still being drained
//! - While draining the normal queue, an `EXTINGUISH` follow-up stops the
//!   current message from reaching the remaining components and is itself
//!   dropped; draining carries on with the next message
//!
//! # Locking
//! Each queue and the registry sits in its own critical-section mutex. A lock
//! is held for a single `put`/`get`/lookup only, `notify` always runs with no
//! lock held. Components may therefore insert messages or change the registry
//! from inside `notify`: a component removed mid-broadcast is skipped from the
//! next index on, one added is reached at the end of the same broadcast.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::component::{follow_up, ComponentRef};
use crate::config::{MAX_OBJECTS, PRIORITY_MESSAGES, STANDARD_MESSAGES};
use crate::error::Result;
use crate::fifo::Fifo;
use crate::message::{Message, MessageKind};
use crate::registry::Registry;

pub struct MessagePipe<'a> {
    normal: Mutex<RefCell<Fifo<Message, STANDARD_MESSAGES>>>,
    urgent: Mutex<RefCell<Fifo<Message, PRIORITY_MESSAGES>>>,
    registry: Mutex<RefCell<Registry<'a, MAX_OBJECTS>>>,
}

impl<'a> MessagePipe<'a> {
    pub const fn new() -> Self {
        Self {
            normal: Mutex::new(RefCell::new(Fifo::new(Message::NULL))),
            urgent: Mutex::new(RefCell::new(Fifo::new(Message::NULL))),
            registry: Mutex::new(RefCell::new(Registry::new())),
        }
    }

    /// Queue `message` for the next drain
    ///
    /// Kinds above the priority borderline go to the urgent queue, everything
    /// else to the normal queue.
    ///
    /// # Errors
    /// Returns `KernelError::QueueFull` if the selected queue is full; the
    /// message is not queued.
    pub fn insert(&self, message: Message) -> Result<()> {
        critical_section::with(|cs| {
            if message.is_urgent() {
                self.urgent.borrow_ref_mut(cs).put(message)
            } else {
                self.normal.borrow_ref_mut(cs).put(message)
            }
        })
    }

    /// Drain both queues, returning how many messages were broadcast
    pub fn dispatch(&self) -> u32 {
        let mut processed = 0u32;

        while let Some(message) = critical_section::with(|cs| self.urgent.borrow_ref_mut(cs).get()) {
            self.broadcast(&message, false);
            processed = processed.wrapping_add(1);
        }

        while let Some(message) = critical_section::with(|cs| self.normal.borrow_ref_mut(cs).get()) {
            self.broadcast(&message, true);
            processed = processed.wrapping_add(1);
        }

        processed
    }

    fn broadcast(&self, message: &Message, extinguishable: bool) {
        let mut index = 0;

        while let Some(component) = self.component_at(index) {
            index += 1;

            let Some(reply) = follow_up(component.notify(message)) else {
                continue;
            };

            if extinguishable && reply.kind == MessageKind::EXTINGUISH {
                log::trace!("{:?} extinguished after {} component(s)", message.kind, index);
                break;
            }

            if let Err(err) = self.insert(reply) {
                log::warn!("Dropping follow-up {:?} to {:?}: {}", reply.kind, message.kind, err);
            }
        }
    }

    fn component_at(&self, index: usize) -> Option<ComponentRef<'a>> {
        critical_section::with(|cs| self.registry.borrow_ref(cs).get(index))
    }

    /// Register `component` for broadcast, appended after existing entries
    ///
    /// # Errors
    /// `RegistryFull` or `AlreadyRegistered`
    pub fn include_component(&self, component: ComponentRef<'a>) -> Result<()> {
        critical_section::with(|cs| self.registry.borrow_ref_mut(cs).include(component))
    }

    /// Remove `component` from broadcast
    ///
    /// # Errors
    /// `ComponentNotFound`
    pub fn exclude_component(&self, component: ComponentRef<'_>) -> Result<()> {
        critical_section::with(|cs| self.registry.borrow_ref_mut(cs).exclude(component))
    }

    /// Broadcast position of `component`
    pub fn find_component(&self, component: ComponentRef<'_>) -> Option<usize> {
        critical_section::with(|cs| self.registry.borrow_ref(cs).find(component))
    }

    pub fn components(&self) -> usize {
        critical_section::with(|cs| self.registry.borrow_ref(cs).len())
    }

    /// Messages waiting in (normal, urgent) queues
    pub fn pending(&self) -> (usize, usize) {
        critical_section::with(|cs| {
            (
                self.normal.borrow_ref(cs).count(),
                self.urgent.borrow_ref(cs).count(),
            )
        })
    }

    /// Empty both queues and forget every component
    pub fn reset(&self) {
        critical_section::with(|cs| {
            self.normal.borrow_ref_mut(cs).clear();
            self.urgent.borrow_ref_mut(cs).clear();
            self.registry.borrow_ref_mut(cs).clear();
        });
    }
}

impl Default for MessagePipe<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Priority};
    use crate::error::KernelError;
    use std::sync::Mutex as StdMutex;
    use std::vec::Vec;

    /// Records every kind it is notified of and answers from a fixed script
    struct Recorder {
        seen: StdMutex<Vec<MessageKind>>,
        reply: Option<(MessageKind, MessageKind)>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                seen: StdMutex::new(Vec::new()),
                reply: None,
            }
        }

        /// Answer `on` with a message of kind `with`
        fn replying(on: MessageKind, with: MessageKind) -> Self {
            Self {
                reply: Some((on, with)),
                ..Self::new()
            }
        }

        fn seen(&self) -> Vec<MessageKind> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Component for Recorder {
        fn priority(&self) -> Priority {
            Priority::Background
        }

        fn notify(&self, message: &Message) -> Option<Message> {
            self.seen.lock().unwrap().push(message.kind);
            match self.reply {
                Some((on, with)) if on == message.kind => Some(Message::new(with, 0, 0)),
                _ => None,
            }
        }

        fn interrupt_callback(&self, _message: &Message) -> Option<Message> {
            None
        }
    }

    fn msg(kind: MessageKind) -> Message {
        Message::new(kind, 0, 0)
    }

    #[test]
    fn test_insert_routes_by_borderline() {
        let pipe = MessagePipe::new();
        pipe.insert(msg(MessageKind::TIME_TICK)).unwrap();
        pipe.insert(msg(MessageKind::urgent(1))).unwrap();
        pipe.insert(msg(MessageKind::REPAINT)).unwrap();

        assert_eq!(pipe.pending(), (2, 1));
    }

    #[test]
    fn test_insert_full_queue_fails() {
        let pipe = MessagePipe::new();
        for _ in 0..STANDARD_MESSAGES {
            pipe.insert(msg(MessageKind::TIME_TICK)).unwrap();
        }
        assert_eq!(
            pipe.insert(msg(MessageKind::TIME_TICK)),
            Err(KernelError::QueueFull {
                capacity: STANDARD_MESSAGES
            })
        );

        // The urgent queue is independent
        pipe.insert(msg(MessageKind::urgent(0))).unwrap();
    }

    #[test]
    fn test_urgent_delivered_before_normal() {
        let pipe = MessagePipe::new();
        let a = Recorder::new();
        let b = Recorder::new();
        pipe.include_component(&a).unwrap();
        pipe.include_component(&b).unwrap();

        let alarm = MessageKind::urgent(7);
        pipe.insert(msg(MessageKind::TIME_TICK)).unwrap();
        pipe.insert(msg(alarm)).unwrap();

        assert_eq!(pipe.dispatch(), 2);
        assert_eq!(a.seen(), vec![alarm, MessageKind::TIME_TICK]);
        assert_eq!(b.seen(), vec![alarm, MessageKind::TIME_TICK]);
        assert_eq!(pipe.pending(), (0, 0));
    }

    #[test]
    fn test_urgent_first_regardless_of_insertion_order() {
        let pipe = MessagePipe::new();
        let a = Recorder::new();
        pipe.include_component(&a).unwrap();

        let alarm = MessageKind::urgent(3);
        pipe.insert(msg(alarm)).unwrap();
        pipe.insert(msg(MessageKind::KEY_SCAN)).unwrap();
        pipe.insert(msg(MessageKind::urgent(4))).unwrap();

        assert_eq!(pipe.dispatch(), 3);
        assert_eq!(
            a.seen(),
            vec![alarm, MessageKind::urgent(4), MessageKind::KEY_SCAN]
        );
    }

    #[test]
    fn test_extinguish_stops_broadcast_of_that_message_only() {
        let pipe = MessagePipe::new();
        let first = Recorder::new();
        let stopper = Recorder::replying(MessageKind::KEY_SCAN, MessageKind::EXTINGUISH);
        let last = Recorder::new();
        pipe.include_component(&first).unwrap();
        pipe.include_component(&stopper).unwrap();
        pipe.include_component(&last).unwrap();

        pipe.insert(msg(MessageKind::KEY_SCAN)).unwrap();
        pipe.insert(msg(MessageKind::REPAINT)).unwrap();

        assert_eq!(pipe.dispatch(), 2);
        assert_eq!(first.seen(), vec![MessageKind::KEY_SCAN, MessageKind::REPAINT]);
        assert_eq!(stopper.seen(), vec![MessageKind::KEY_SCAN, MessageKind::REPAINT]);
        // Never saw KEY_SCAN, and the EXTINGUISH reply was not re-queued
        assert_eq!(last.seen(), vec![MessageKind::REPAINT]);
    }

    #[test]
    fn test_follow_up_is_chained_in_same_drain() {
        let pipe = MessagePipe::new();
        let echo = Recorder::replying(MessageKind::KEY_SCAN, MessageKind::REPAINT);
        let listener = Recorder::new();
        pipe.include_component(&echo).unwrap();
        pipe.include_component(&listener).unwrap();

        pipe.insert(msg(MessageKind::KEY_SCAN)).unwrap();

        assert_eq!(pipe.dispatch(), 2);
        assert_eq!(listener.seen(), vec![MessageKind::KEY_SCAN, MessageKind::REPAINT]);
    }

    #[test]
    fn test_urgent_follow_up_extinguish_is_requeued() {
        let pipe = MessagePipe::new();
        let alarm = MessageKind::urgent(3);
        let responder = Recorder::replying(alarm, MessageKind::EXTINGUISH);
        let listener = Recorder::new();
        pipe.include_component(&responder).unwrap();
        pipe.include_component(&listener).unwrap();

        pipe.insert(msg(alarm)).unwrap();

        // The urgent message reaches everyone, its EXTINGUISH reply is then
        // broadcast as an ordinary normal message
        assert_eq!(pipe.dispatch(), 2);
        assert_eq!(listener.seen(), vec![alarm, MessageKind::EXTINGUISH]);
    }

    #[test]
    fn test_dispatch_with_no_components_still_drains() {
        let pipe = MessagePipe::new();
        pipe.insert(msg(MessageKind::TIME_TICK)).unwrap();
        pipe.insert(msg(MessageKind::urgent(0))).unwrap();

        assert_eq!(pipe.dispatch(), 2);
        assert_eq!(pipe.dispatch(), 0);
    }

    #[test]
    fn test_excluded_component_stops_receiving() {
        let pipe = MessagePipe::new();
        let a = Recorder::new();
        let b = Recorder::new();
        pipe.include_component(&a).unwrap();
        pipe.include_component(&b).unwrap();

        pipe.exclude_component(&a).unwrap();
        assert_eq!(pipe.find_component(&b), Some(0));

        pipe.insert(msg(MessageKind::REPAINT)).unwrap();
        pipe.dispatch();
        assert!(a.seen().is_empty());
        assert_eq!(b.seen(), vec![MessageKind::REPAINT]);
    }
}
