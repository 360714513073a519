//! Error types for the logging facade

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP transport error talking to the indexing backend
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// The indexing backend client could not be set up at startup
    #[error("Failed to construct indexing client for '{url}': {message}")]
    ClientConstruction { url: String, message: String },

    /// The indexing backend rejected or failed a bulk request
    #[error("Indexing into '{index}' failed: {message}")]
    Indexing { index: String, message: String },

    /// Request context carries no request id
    #[error("Request context has no '{key}' value")]
    MissingRequestId { key: String },

    /// Request context carries a request id that is not a string
    #[error("Request context value '{key}' is not a string (found {found})")]
    InvalidRequestId { key: String, found: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a client construction error
    pub fn client_construction(url: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ClientConstruction {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an indexing error
    pub fn indexing(index: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Indexing {
            index: index.into(),
            message: message.into(),
        }
    }

    pub fn missing_request_id(key: impl Into<String>) -> Self {
        LoggerError::MissingRequestId { key: key.into() }
    }

    pub fn invalid_request_id(key: impl Into<String>, found: impl Into<String>) -> Self {
        LoggerError::InvalidRequestId {
            key: key.into(),
            found: found.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LogConfig", "missing host url");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::client_construction("http://localhost:9200", "connection refused");
        assert!(matches!(err, LoggerError::ClientConstruction { .. }));

        let err = LoggerError::missing_request_id("RequestId");
        assert!(matches!(err, LoggerError::MissingRequestId { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("LogConfig", "missing host url");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LogConfig: missing host url"
        );

        let err = LoggerError::indexing("app-logs-2024-03-05", "status 503");
        assert_eq!(
            err.to_string(),
            "Indexing into 'app-logs-2024-03-05' failed: status 503"
        );

        let err = LoggerError::invalid_request_id("RequestId", "integer");
        assert_eq!(
            err.to_string(),
            "Request context value 'RequestId' is not a string (found integer)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: LoggerError = io_err.into();

        assert!(matches!(err, LoggerError::IoError(_)));
        assert!(err.to_string().contains("stdout closed"));
    }
}
