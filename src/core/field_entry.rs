//! Chained field attachment terminated by a level call

use super::log_context::{FieldValue, LogContext};
use super::log_level::LogLevel;
use super::logger::Logger;

/// Log entry under construction
///
/// Returned by `with_fields` on a [`FieldLogger`](crate::FieldLogger). Fields
/// are collected until one of the level methods hands the entry to the
/// logger. Attaching a key twice keeps the last value.
///
/// # Example
///
/// ```
/// use pllog::prelude::*;
///
/// let logger = Logger::new();
///
/// FieldEntry::new(&logger, LogContext::new().with_field("user_id", 12345))
///     .with_field("latency_ms", 42.5)
///     .with_field("status", 200)
///     .info("Request processed");
/// ```
#[must_use = "an entry does nothing until a level method is called"]
pub struct FieldEntry<'a> {
    logger: &'a Logger,
    fields: LogContext,
}

impl<'a> FieldEntry<'a> {
    pub fn new(logger: &'a Logger, fields: LogContext) -> Self {
        Self { logger, fields }
    }

    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.add_field(key, value);
        self
    }

    pub fn with_fields(mut self, fields: LogContext) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Fields attached so far
    pub fn fields(&self) -> &LogContext {
        &self.fields
    }

    pub fn log(self, level: LogLevel, message: impl Into<String>) {
        self.logger.log_with_fields(level, message, self.fields);
    }

    pub fn trace(self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Logs at `Fatal`; the process keeps running
    pub fn fatal(self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }
}
