//! Dispatch Benchmarks
//!
//! Direct command/query/event dispatch against queued event delivery.
//!
//! Run with: cargo bench --bench dispatch_benchmarks

use async_trait::async_trait;
use courier::prelude::*;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct Increment(u64);

impl Message for Increment {
    type Kind = CommandKind;
}
impl Command for Increment {}

struct Read;

impl Message for Read {
    type Kind = QueryKind;
}
impl Query for Read {
    type Result = u64;
}

struct Ticked(u64);

impl Message for Ticked {
    type Kind = EventKind;
}
impl Event for Ticked {}

#[derive(Default)]
struct Counter {
    value: AtomicU64,
}

#[async_trait]
impl CommandHandler<Increment> for Counter {
    async fn handle(
        &self,
        command: Increment,
        _cancel: &CancellationToken,
    ) -> Result<(), HandlerError> {
        self.value.fetch_add(command.0, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl QueryHandler<Read> for Counter {
    async fn handle(&self, _query: Read, _cancel: &CancellationToken) -> Result<u64, HandlerError> {
        Ok(self.value.load(Ordering::Relaxed))
    }
}

#[async_trait]
impl EventHandler<Ticked> for Counter {
    async fn handle(
        &self,
        event: &Ticked,
        _cancel: &CancellationToken,
    ) -> Result<(), HandlerError> {
        self.value.fetch_add(event.0, Ordering::Relaxed);
        Ok(())
    }
}

fn registry_with(counter: &Arc<Counter>, subscribers: usize) -> Arc<HandlerRegistry> {
    let registry = Arc::new(HandlerRegistry::new());
    registry.register_command::<Increment, _>(counter.clone());
    registry.register_query::<Read, _>(counter.clone());
    for _ in 0..subscribers {
        registry.register_event::<Ticked, _>(counter.clone());
    }
    registry
}

// ============================================================================
// Direct Dispatch Benchmarks
// ============================================================================

fn direct_dispatch_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let counter = Arc::new(Counter::default());
    let dispatcher = Dispatcher::new(registry_with(&counter, 4));
    let cancel = CancellationToken::new();

    let mut group = c.benchmark_group("direct_dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("send_command", |b| {
        b.to_async(&rt).iter(|| async {
            dispatcher
                .send_command(Increment(black_box(1)), &cancel)
                .await
                .unwrap();
        });
    });

    group.bench_function("send_query", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(dispatcher.send_query(Read, &cancel).await.unwrap());
        });
    });

    group.bench_function("publish_4_subscribers", |b| {
        b.to_async(&rt).iter(|| async {
            dispatcher
                .publish(Ticked(black_box(1)), &cancel)
                .await
                .unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Queued Event Benchmarks
// ============================================================================

fn queued_publish_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("queued_events");
    const BATCH: u64 = 1_000;
    group.throughput(Throughput::Elements(BATCH));

    for (name, config) in [
        ("unbounded", QueueConfig::new()),
        ("bounded_128", QueueConfig::new().with_capacity(128)),
    ] {
        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| {
                let config = config.clone();
                async move {
                    let counter = Arc::new(Counter::default());
                    let (bus, consumer) = QueuedBus::new(registry_with(&counter, 1), config);
                    let worker = consumer.spawn(CancellationToken::new());

                    for n in 0..BATCH {
                        bus.publish(Ticked(n)).await.unwrap();
                    }
                    drop(bus);

                    black_box(worker.await.unwrap().unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, direct_dispatch_benchmark, queued_publish_benchmark);
criterion_main!(benches);
