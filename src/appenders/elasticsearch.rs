//! Elasticsearch hook: ships records to daily indices through the Bulk API
//!
//! Records are buffered in `append` and sent in one bulk request per
//! `flush`. Attached to an async [`Logger`](crate::Logger), that means one
//! request per worker batch, off the caller's thread.

use crate::core::{Appender, LogEntry, LogLevel, Result, TimestampFormat};
use crate::indexing::{BulkRequest, ElasticClient, IndexNamer};
use serde_json::{json, Value};

/// Appender forwarding every record at or above its level to Elasticsearch
///
/// Each record becomes the document
///
/// ```json
/// {"Host": "web-1", "@timestamp": "2024-03-05T10:00:00.5Z",
///  "Message": "Request processed", "Data": {"RequestId": "abc-123"}, "Level": "INFO"}
/// ```
///
/// indexed into `{prefix}-{YYYY-MM-DD}` for the record's local date. A
/// failed bulk request loses its batch; it is reported through the returned
/// error and never retried.
pub struct ElasticsearchAppender {
    client: ElasticClient,
    host: String,
    min_level: LogLevel,
    index_namer: IndexNamer,
    pending: BulkRequest,
}

impl ElasticsearchAppender {
    pub fn new(client: ElasticClient, host: impl Into<String>, index_namer: IndexNamer) -> Self {
        Self {
            client,
            host: host.into(),
            min_level: LogLevel::Trace,
            index_namer,
            pending: BulkRequest::new(),
        }
    }

    /// Only forward records at or above `level`
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Number of documents waiting for the next flush
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Document indexed for `entry`
    pub fn document(host: &str, entry: &LogEntry) -> Value {
        json!({
            "Host": host,
            "@timestamp": TimestampFormat::Rfc3339Nanos.format(&entry.timestamp),
            "Message": entry.message,
            "Data": Value::Object(entry.fields.to_json_map()),
            "Level": entry.level.long_name(),
        })
    }
}

impl Appender for ElasticsearchAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if entry.level < self.min_level {
            return Ok(());
        }

        let index = self.index_namer.name_for(&entry.timestamp);
        let document = Self::document(&self.host, entry);
        self.pending.push(&index, &document)
    }

    fn flush(&mut self) -> Result<()> {
        let batch = std::mem::take(&mut self.pending);
        self.client.bulk(&batch)
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}
