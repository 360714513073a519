//! Logger facade: a local-only logger or one that also ships to Elasticsearch
//!
//! Construct one logger at process start from a [`LogConfig`] and pass it to
//! the code that logs. There is no global instance.
//!
//! ```no_run
//! use pllog::{new_logger, FieldLogger, LogConfig, LogContext};
//!
//! let config = LogConfig::from_args_or_exit();
//! let logger = new_logger(&config).expect("logging backend unavailable");
//!
//! logger
//!     .with_fields(LogContext::new().with_field("order_id", 42))
//!     .info("Order accepted");
//! ```

use crate::appenders::{ConsoleAppender, ElasticsearchAppender};
use crate::config::LogConfig;
use crate::core::{FieldEntry, LogContext, LogLevel, Logger, Result};
use crate::indexing::ElasticClient;
use std::time::Duration;

/// Queue size of the enabled logger's background worker
pub const INDEXING_BUFFER_SIZE: usize = 4096;

/// Entry point for structured logging
///
/// Implemented by [`LocalLogger`] (indexing disabled) and
/// [`IndexingLogger`] (indexing enabled).
pub trait FieldLogger: Send + Sync {
    /// Start an entry carrying `fields`
    fn with_fields(&self, fields: LogContext) -> FieldEntry<'_>;

    /// Flush the appenders
    fn flush(&self) -> Result<()>;

    /// Whether records are forwarded to the indexing backend
    fn is_indexing(&self) -> bool;
}

/// Build the logger described by `config`
///
/// A disabled configuration yields a [`LocalLogger`] without touching the
/// network or any other field of the configuration. An enabled one is
/// validated, then the Elasticsearch client is constructed (health check and
/// optional sniffing) and an [`IndexingLogger`] returned.
///
/// # Errors
///
/// [`LoggerError::InvalidConfiguration`](crate::LoggerError::InvalidConfiguration)
/// or [`LoggerError::ClientConstruction`](crate::LoggerError::ClientConstruction)
/// in enabled mode.
pub fn new_logger(config: &LogConfig) -> Result<Box<dyn FieldLogger>> {
    if !config.enable {
        return Ok(Box::new(LocalLogger::new()));
    }
    Ok(Box::new(IndexingLogger::new(config)?))
}

/// Like [`new_logger`], but a logger that cannot be built aborts the process
///
/// Logging infrastructure is resolved once at boot; an enabled backend that
/// is unreachable at that point is treated as a startup failure.
pub fn new_logger_or_abort(config: &LogConfig) -> Box<dyn FieldLogger> {
    match new_logger(config) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("[LOGGER CRITICAL] Failed to set up logging: {}", e);
            std::process::abort();
        }
    }
}

/// Parse flags and environment, then build the logger
///
/// Exits with 0 on `--help`, 1 on invalid flags, aborts if the enabled
/// backend cannot be reached.
pub fn from_env_or_exit() -> Box<dyn FieldLogger> {
    new_logger_or_abort(&LogConfig::from_args_or_exit())
}

/// Logger used when indexing is disabled: synchronous, stdout only, `Debug`
/// and above
///
/// Output failures are discarded.
pub struct LocalLogger {
    logger: Logger,
}

impl LocalLogger {
    pub fn new() -> Self {
        let logger = Logger::builder()
            .min_level(LogLevel::Debug)
            .appender(ConsoleAppender::stdout())
            .build();
        Self { logger }
    }

    /// Underlying logger
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Default for LocalLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldLogger for LocalLogger {
    fn with_fields(&self, fields: LogContext) -> FieldEntry<'_> {
        FieldEntry::new(&self.logger, fields)
    }

    fn flush(&self) -> Result<()> {
        self.logger.flush()
    }

    fn is_indexing(&self) -> bool {
        false
    }
}

/// Logger used when indexing is enabled
///
/// Records at or above the configured level are written to stderr and
/// queued for a background worker, which ships them to Elasticsearch in
/// batches.
pub struct IndexingLogger {
    logger: Logger,
    config: LogConfig,
}

impl IndexingLogger {
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the backend cannot be reached.
    pub fn new(config: &LogConfig) -> Result<Self> {
        config.validate()?;
        let client = ElasticClient::connect(&config.host_url, config.sniff)?;
        Ok(Self::with_client(config, client))
    }

    /// Build around an already connected client
    pub fn with_client(config: &LogConfig, client: ElasticClient) -> Self {
        let hook = ElasticsearchAppender::new(client, config.host_name.clone(), config.index_namer())
            .with_min_level(config.level);

        let logger = Logger::builder()
            .min_level(config.level)
            .appender(ConsoleAppender::stderr())
            .appender(hook)
            .async_mode(INDEXING_BUFFER_SIZE)
            .build();

        let indexing = Self {
            logger,
            config: config.clone(),
        };
        FieldEntry::new(&indexing.logger, config.to_fields()).info("Logging to Elasticsearch");
        indexing
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Underlying logger
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Drain queued records within `timeout`; see [`Logger::shutdown`]
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        self.logger.shutdown(timeout)
    }
}

impl FieldLogger for IndexingLogger {
    fn with_fields(&self, fields: LogContext) -> FieldEntry<'_> {
        FieldEntry::new(&self.logger, fields)
    }

    fn flush(&self) -> Result<()> {
        self.logger.flush()
    }

    fn is_indexing(&self) -> bool {
        true
    }
}
