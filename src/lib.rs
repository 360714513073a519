//! # pllog
//!
//! Structured logging facade with optional shipping of log records to
//! Elasticsearch.
//!
//! ## Features
//!
//! - **Two modes**: a local stdout logger, or a logger that also forwards
//!   every record to daily `{prefix}-{YYYY-MM-DD}` indices
//! - **Asynchronous shipping**: records are batched by a background worker
//!   and sent through the Bulk API, off the caller's thread
//! - **Flag and environment configuration**: `--log-*` flags or `LOG_*`
//!   variables, ignoring the host program's own flags
//! - **Request correlation**: entries pre-populated with the request id of
//!   a [`RequestContext`]

pub mod appenders;
pub mod config;
pub mod core;
pub mod facade;
pub mod indexing;
pub mod request_context;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, ElasticsearchAppender};
    pub use crate::config::LogConfig;
    pub use crate::core::{
        Appender, FieldEntry, FieldValue, LogContext, LogEntry, LogLevel, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, OutputFormat, Result, TimestampFormat,
    };
    pub use crate::facade::{new_logger, FieldLogger, IndexingLogger, LocalLogger};
    pub use crate::indexing::IndexNamer;
    pub use crate::request_context::{entry_from_context, get_request_id, RequestContext};
}

pub use appenders::{ConsoleAppender, ConsoleTarget, ElasticsearchAppender};
pub use config::LogConfig;
pub use core::{
    Appender, FieldEntry, FieldValue, LogContext, LogEntry, LogLevel, Logger, LoggerBuilder,
    LoggerError, LoggerMetrics, OutputFormat, Result, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use facade::{
    from_env_or_exit, new_logger, new_logger_or_abort, FieldLogger, IndexingLogger, LocalLogger,
};
pub use indexing::{BulkRequest, ElasticClient, IndexNamer};
pub use request_context::{
    entry_from_context, get_correlation_id, get_request_id, RequestContext, CORRELATION_ID,
    CORRELATION_ID_HEADER, REQUEST_ID, REQUEST_ID_HEADER,
};
