//! Level-filtered logger dispatching records to appenders

use super::{
    appender::Appender, error::Result, log_context::LogContext, log_entry::LogEntry,
    log_level::LogLevel, metrics::LoggerMetrics,
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// Used when the logger is dropped without an explicit `shutdown()`.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum number of records handed to the appenders in one batch
const BATCH_SIZE: usize = 50;
/// How long a small batch waits for more records before being processed
const BATCH_TIMEOUT: Duration = Duration::from_millis(10);

type SharedAppenders = Arc<RwLock<Vec<Box<dyn Appender>>>>;

pub struct Logger {
    min_level: Arc<RwLock<LogLevel>>,
    appenders: SharedAppenders,
    sender: Option<Sender<LogEntry>>,
    worker: Option<thread::JoinHandle<()>>,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Synchronous logger: records are written on the calling thread
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: Arc::new(RwLock::new(LogLevel::Info)),
            appenders: Arc::new(RwLock::new(Vec::new())),
            sender: None,
            worker: None,
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    /// Asynchronous logger: records are queued on a bounded channel and
    /// written in batches by a background worker thread
    ///
    /// When the queue is full new records are dropped and counted.
    #[must_use]
    pub fn with_async(buffer_size: usize) -> Self {
        let (sender, receiver) = bounded(buffer_size.max(1));
        let appenders: SharedAppenders = Arc::new(RwLock::new(Vec::new()));
        let metrics = Arc::new(LoggerMetrics::new());

        let worker_appenders = Arc::clone(&appenders);
        let worker_metrics = Arc::clone(&metrics);
        let worker = thread::spawn(move || {
            Self::run_worker(&receiver, &worker_appenders, &worker_metrics);
        });

        Self {
            min_level: Arc::new(RwLock::new(LogLevel::Info)),
            appenders,
            sender: Some(sender),
            worker: Some(worker),
            metrics,
        }
    }

    fn run_worker(
        receiver: &Receiver<LogEntry>,
        appenders: &SharedAppenders,
        metrics: &Arc<LoggerMetrics>,
    ) {
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        // recv() fails once every sender is gone and the channel is drained
        while let Ok(entry) = receiver.recv() {
            batch.push(entry);
            batch.extend(receiver.try_iter().take(BATCH_SIZE - batch.len()));

            if batch.len() < BATCH_SIZE {
                thread::sleep(BATCH_TIMEOUT);
                batch.extend(receiver.try_iter().take(BATCH_SIZE - batch.len()));
            }

            Self::process_batch(appenders, &batch, metrics);
            batch.clear();
        }
    }

    /// Append every record of the batch to every appender, then flush each
    /// appender once
    ///
    /// Each appender call is wrapped in `catch_unwind` so one failing
    /// appender cannot starve the others.
    fn process_batch(appenders: &SharedAppenders, batch: &[LogEntry], metrics: &LoggerMetrics) {
        let mut appenders = appenders.write();

        for entry in batch {
            Self::append_isolated(&mut appenders, entry, metrics);
        }

        for (idx, appender) in appenders.iter_mut().enumerate() {
            let flushed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.flush()
            }));

            match flushed {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    metrics.record_failed_flush();
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) flush failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                }
                Err(panic) => {
                    metrics.record_failed_flush();
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked during flush: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(&panic)
                    );
                }
            }
        }
    }

    /// Returns `true` when at least one appender failed on the entry
    fn append_isolated(
        appenders: &mut [Box<dyn Appender>],
        entry: &LogEntry,
        metrics: &LoggerMetrics,
    ) -> bool {
        let mut has_error = false;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            let appended = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(entry)
            }));

            match appended {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(&panic)
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }

        has_error
    }

    pub fn add_appender(&mut self, appender: Box<dyn Appender>) {
        self.appenders.write().push(appender);
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.read()
    }

    /// Names of the attached appenders, in dispatch order
    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .read()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    pub fn is_async(&self) -> bool {
        self.sender.is_some()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_with_fields(level, message, LogContext::new());
    }

    /// Log with structured fields
    pub fn log_with_fields(&self, level: LogLevel, message: impl Into<String>, fields: LogContext) {
        if level < self.min_level() {
            return;
        }

        let entry = LogEntry::new(level, message.into()).with_fields(fields);
        self.send_entry(entry);
    }

    fn send_entry(&self, entry: LogEntry) {
        match self.sender {
            Some(ref sender) => match sender.try_send(entry) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => self.alert_and_drop(),
                // Logger is shutting down
                Err(TrySendError::Disconnected(_)) => {}
            },
            None => {
                let mut appenders = self.appenders.write();
                Self::append_isolated(&mut appenders, &entry, &self.metrics);
            }
        }
    }

    fn alert_and_drop(&self) {
        self.metrics.record_queue_full();
        let dropped = self.metrics.record_dropped() + 1;

        if dropped == 1 || dropped % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Queue full, {} logs dropped. \
                 Consider increasing the buffer size.",
                dropped
            );
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every appender
    ///
    /// In async mode this does not wait for records still queued for the
    /// worker; use [`Logger::shutdown`] to drain them.
    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Stop accepting records, wait up to `timeout` for the worker to drain
    /// the queue, then flush
    ///
    /// Returns `true` if everything was written within the timeout.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        if let Some(handle) = self.worker.take() {
            let start = Instant::now();

            while !handle.is_finished() {
                if start.elapsed() >= timeout {
                    eprintln!(
                        "[LOGGER WARNING] Async worker did not finish within {:?}. \
                         Some logs may be lost.",
                        timeout
                    );
                    return false;
                }
                thread::sleep(Duration::from_millis(10));
            }

            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Async worker panicked during shutdown: {:?}", e);
                return false;
            }
        }

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }

        true
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing a [`Logger`]
///
/// # Example
/// ```
/// use pllog::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .appender(ConsoleAppender::stdout())
///     .async_mode(1000)
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    appenders: Vec<Box<dyn Appender>>,
    async_buffer: Option<usize>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            appenders: Vec::new(),
            async_buffer: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Enable async mode with the given queue size
    ///
    /// If not called, the logger is synchronous.
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, buffer_size: usize) -> Self {
        self.async_buffer = Some(buffer_size);
        self
    }

    pub fn build(self) -> Logger {
        let mut logger = match self.async_buffer {
            Some(size) => Logger::with_async(size),
            None => Logger::new(),
        };

        logger.set_min_level(self.min_level);
        for appender in self.appenders {
            logger.add_appender(appender);
        }

        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
