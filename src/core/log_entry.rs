//! Log record dispatched to appenders

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    #[serde(default, skip_serializing_if = "LogContext::is_empty")]
    pub fields: LogContext,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            level,
            message,
            timestamp: Utc::now(),
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            fields: LogContext::new(),
        }
    }

    pub fn with_fields(mut self, fields: LogContext) -> Self {
        self.fields = fields;
        self
    }

    /// Message with newlines, carriage returns and tabs escaped
    ///
    /// Line-oriented output uses this so a message can never forge
    /// additional log lines. `message` itself is kept verbatim.
    pub fn escaped_message(&self) -> String {
        self.message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Thread name if the thread has one, its id otherwise
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_kept_verbatim() {
        let entry = LogEntry::new(LogLevel::Info, "line1\nline2\tend".to_string());
        assert_eq!(entry.message, "line1\nline2\tend");
        assert_eq!(entry.escaped_message(), "line1\\nline2\\tend");
    }

    #[test]
    fn test_thread_label() {
        let entry = std::thread::Builder::new()
            .name("worker-7".to_string())
            .spawn(|| LogEntry::new(LogLevel::Debug, "x".to_string()))
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(entry.thread_label(), "worker-7");
    }

    #[test]
    fn test_empty_fields_not_serialized() {
        let entry = LogEntry::new(LogLevel::Info, "plain".to_string());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("fields").is_none());
    }
}
