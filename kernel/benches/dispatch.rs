//! Dispatch-path benchmarks: pipe drain, router fan-out and the tick handler

use std::hint::black_box;
use std::sync::atomic::{AtomicU32, Ordering};

use criterion::{criterion_group, criterion_main, Criterion};
use pulse_kernel::port::sim::SimPort;
use pulse_kernel::*;

struct Sink {
    priority: Priority,
    seen: AtomicU32,
}

impl Sink {
    fn new(priority: Priority) -> Self {
        Self {
            priority,
            seen: AtomicU32::new(0),
        }
    }
}

impl Component for Sink {
    fn priority(&self) -> Priority {
        self.priority
    }

    fn notify(&self, _message: &Message) -> Option<Message> {
        self.seen.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn interrupt_callback(&self, _message: &Message) -> Option<Message> {
        self.seen.fetch_add(1, Ordering::Relaxed);
        None
    }
}

fn pipe_bench(c: &mut Criterion) {
    let sinks: Vec<Sink> = (0..8).map(|_| Sink::new(Priority::Background)).collect();
    let pipe = MessagePipe::new();
    for sink in &sinks {
        pipe.include_component(sink).expect("include");
    }

    c.bench_function("pipe-drain-4x8", |b| {
        b.iter(|| {
            for _ in 0..config::STANDARD_MESSAGES {
                pipe.insert(Message::new(MessageKind::TIME_TICK, 0, 0))
                    .expect("insert");
            }
            black_box(pipe.dispatch())
        })
    });
}

fn router_bench(c: &mut Criterion) {
    let critical = Sink::new(Priority::TimeCritical);
    let normal = Sink::new(Priority::Normal);
    let kernel = Kernel::new(SimPort::new(), KernelConfig::DEFAULT, AppHooks::NONE);
    kernel.install_callback(&critical, Vector::Tim2);
    kernel.install_callback(&normal, Vector::Uart1);

    c.bench_function("route-time-critical", |b| {
        let message = Message::from_irq(MessageKind::HARD_TICK, Vector::Tim2, 0);
        b.iter(|| kernel.dispatch(black_box(message)))
    });

    c.bench_function("route-normal-and-service", |b| {
        let message = Message::from_irq(MessageKind::UART_RX, Vector::Uart1, 0);
        b.iter(|| {
            kernel.dispatch(black_box(message));
            black_box(kernel.service_callbacks())
        })
    });
}

fn heartbeat_bench(c: &mut Criterion) {
    let kernel = Kernel::new(SimPort::new(), KernelConfig::DEFAULT, AppHooks::NONE);

    c.bench_function("heartbeat-and-drain", |b| {
        b.iter(|| {
            kernel.heartbeat();
            black_box(kernel.run_once())
        })
    });
}

criterion_group!(benches, pipe_bench, router_bench, heartbeat_bench);
criterion_main!(benches);
