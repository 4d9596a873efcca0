//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Mutex;

use pulse_kernel::port::sim::SimPort;
use pulse_kernel::*;

/// Reply rule: `(incoming kind, follow-up kind)`
pub type Rule = (MessageKind, MessageKind);

/// Component that records everything it hears
pub struct Probe {
    pub name: &'static str,
    priority: Priority,
    notify_rule: Option<Rule>,
    callback_rule: Option<Rule>,
    notified: Mutex<Vec<Message>>,
    called: Mutex<Vec<Message>>,
}

impl Probe {
    pub fn new(name: &'static str, priority: Priority) -> Self {
        Self {
            name,
            priority,
            notify_rule: None,
            callback_rule: None,
            notified: Mutex::new(Vec::new()),
            called: Mutex::new(Vec::new()),
        }
    }

    pub fn on_notify(mut self, on: MessageKind, reply: MessageKind) -> Self {
        self.notify_rule = Some((on, reply));
        self
    }

    pub fn on_callback(mut self, on: MessageKind, reply: MessageKind) -> Self {
        self.callback_rule = Some((on, reply));
        self
    }

    pub fn notified(&self) -> Vec<MessageKind> {
        self.notified.lock().unwrap().iter().map(|m| m.kind).collect()
    }

    pub fn notified_messages(&self) -> Vec<Message> {
        self.notified.lock().unwrap().clone()
    }

    pub fn called(&self) -> Vec<MessageKind> {
        self.called.lock().unwrap().iter().map(|m| m.kind).collect()
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.notified().into_iter().filter(|k| *k == kind).count()
    }
}

fn answer(rule: Option<Rule>, message: &Message) -> Option<Message> {
    match rule {
        Some((on, reply)) if on == message.kind => Some(Message {
            kind: reply,
            ..*message
        }),
        _ => None,
    }
}

impl Component for Probe {
    fn priority(&self) -> Priority {
        self.priority
    }

    fn notify(&self, message: &Message) -> Option<Message> {
        self.notified.lock().unwrap().push(*message);
        answer(self.notify_rule, message)
    }

    fn interrupt_callback(&self, message: &Message) -> Option<Message> {
        self.called.lock().unwrap().push(*message);
        answer(self.callback_rule, message)
    }
}

pub fn kernel<'a>() -> Kernel<'a, SimPort> {
    kernel_with(KernelConfig::DEFAULT)
}

pub fn kernel_with<'a>(config: KernelConfig) -> Kernel<'a, SimPort> {
    let kernel = Kernel::new(SimPort::new(), config, AppHooks::NONE);
    kernel.initialize();
    kernel.port().configure_tick(config.tick_reload());
    kernel
}
