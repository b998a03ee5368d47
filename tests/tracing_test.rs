#![cfg(feature = "tracing")]

use hive::{Hive, Limits};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

/// Counts `hive` events by level.
#[derive(Default)]
struct Counter {
    trace: AtomicUsize,
    debug: AtomicUsize,
}

struct CountingSubscriber(Arc<Counter>);

impl Subscriber for CountingSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target() == "hive"
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let level = *event.metadata().level();
        if level == Level::TRACE {
            self.0.trace.fetch_add(1, Ordering::Relaxed);
        } else if level == Level::DEBUG {
            self.0.debug.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

#[test]
fn test_block_lifecycle_is_traced() {
    let counter = Arc::new(Counter::default());
    let subscriber = CountingSubscriber(Arc::clone(&counter));

    tracing::subscriber::with_default(subscriber, || {
        let mut hive = Hive::with_limits(Limits::new(4, 4).unwrap());
        for i in 0..8 {
            hive.insert(i);
        }
        assert!(counter.trace.load(Ordering::Relaxed) >= 2, "block allocations");

        hive.reshape(Limits::new(8, 8).unwrap()).unwrap();
        assert_eq!(counter.debug.load(Ordering::Relaxed), 1, "reshape");

        hive.clear();
        let before = counter.trace.load(Ordering::Relaxed);
        hive.shrink_to_fit();
        assert!(counter.trace.load(Ordering::Relaxed) > before, "block release");
    });
}
