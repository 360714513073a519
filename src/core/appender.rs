//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};

/// Destination for log records
///
/// `append` is called for every record that passes the logger's level filter.
/// Appenders that batch (such as the indexing hook) may only buffer in
/// `append` and do the actual I/O in `flush`, which the logger calls after
/// each batch.
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
