//! Stress tests for the async logger
//!
//! These tests verify:
//! - Concurrent callers sharing one facade
//! - Records dropped on a full queue are counted, never blocking the caller
//! - A slow appender does not stall logging threads

use parking_lot::Mutex;
use pllog::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct CountingAppender {
    count: Arc<AtomicUsize>,
    request_ids: Arc<Mutex<Vec<String>>>,
}

impl Appender for CountingAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Some(id) = entry.fields.get("RequestId").and_then(FieldValue::as_str) {
            self.request_ids.lock().push(id.to_string());
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Appender that takes its time on every batch
struct SlowAppender {
    delay: Duration,
}

impl Appender for SlowAppender {
    fn append(&mut self, _entry: &LogEntry) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        thread::sleep(self.delay);
        Ok(())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[test]
fn test_concurrent_requests_keep_their_ids() {
    let counting = CountingAppender::default();
    let logger = Arc::new(
        Logger::builder()
            .min_level(LogLevel::Debug)
            .appender(counting.clone())
            .async_mode(10_000)
            .build(),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..250 {
                    let ctx = RequestContext::new().with_request_id(format!("t{}-r{}", t, i));
                    let fields = LogContext::new().with_field("RequestId", format!("t{}-r{}", t, i));
                    assert_eq!(pllog::get_request_id(&ctx), Some(format!("t{}-r{}", t, i).as_str()));
                    FieldEntry::new(&logger, fields).info("handled");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let mut logger = Arc::try_unwrap(logger).ok().expect("sole owner");
    assert!(logger.shutdown(Duration::from_secs(10)));

    assert_eq!(counting.count.load(Ordering::SeqCst), 2000);
    assert_eq!(logger.metrics().dropped_count(), 0);

    let mut ids = counting.request_ids.lock().clone();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 2000);
}

#[test]
fn test_full_queue_drops_instead_of_blocking() {
    let mut logger = Logger::builder()
        .min_level(LogLevel::Trace)
        .appender(SlowAppender {
            delay: Duration::from_millis(50),
        })
        .async_mode(4)
        .build();

    let start = Instant::now();
    for i in 0..500 {
        logger.trace(format!("flood {}", i));
    }
    let elapsed = start.elapsed();

    assert!(elapsed < Duration::from_secs(2), "logging blocked for {:?}", elapsed);
    assert!(logger.metrics().queue_full_events() > 0);
    assert!(logger.dropped_count() > 0);

    assert!(logger.shutdown(Duration::from_secs(10)));
    assert_eq!(
        logger.metrics().total_logged() + logger.dropped_count(),
        500
    );
}
