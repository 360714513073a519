//! Request-scoped values and the request-id log entry helper

use crate::core::{FieldEntry, FieldValue, LogContext, LoggerError, Result};
use crate::facade::FieldLogger;
use std::collections::HashMap;

/// Context key and log field of the request id
pub const REQUEST_ID: &str = "RequestId";
/// Context key of the correlation id
pub const CORRELATION_ID: &str = "CorrelationId";
/// HTTP header carrying the request id
pub const REQUEST_ID_HEADER: &str = "Request-Id";
/// HTTP header carrying the correlation id
pub const CORRELATION_ID_HEADER: &str = "Correlation-Id";

/// Values attached to one request while it is being handled
///
/// # Example
///
/// ```
/// use pllog::{entry_from_context, LocalLogger, RequestContext};
///
/// let logger = LocalLogger::new();
/// let ctx = RequestContext::new().with_request_id("abc-123");
///
/// entry_from_context(&ctx, &logger)
///     .expect("request id is set")
///     .with_field("path", "/orders")
///     .info("Request received");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    values: HashMap<String, FieldValue>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the request and correlation ids out of HTTP headers
    ///
    /// Header names are matched case-insensitively; other headers are
    /// ignored.
    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut ctx = Self::new();
        for (name, value) in headers {
            let name = name.as_ref();
            let value: String = value.into();
            if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
                ctx.insert(REQUEST_ID, value);
            } else if name.eq_ignore_ascii_case(CORRELATION_ID_HEADER) {
                ctx.insert(CORRELATION_ID, value);
            }
        }
        ctx
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        self.with_value(REQUEST_ID, FieldValue::String(request_id.into()))
    }

    #[must_use]
    pub fn with_correlation_id(self, correlation_id: impl Into<String>) -> Self {
        self.with_value(CORRELATION_ID, FieldValue::String(correlation_id.into()))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }
}

/// The request id, if present and a string
pub fn get_request_id(ctx: &RequestContext) -> Option<&str> {
    ctx.get(REQUEST_ID).and_then(FieldValue::as_str)
}

/// The correlation id, if present and a string
pub fn get_correlation_id(ctx: &RequestContext) -> Option<&str> {
    ctx.get(CORRELATION_ID).and_then(FieldValue::as_str)
}

/// Start a log entry carrying the request id of `ctx`
///
/// Only the request id is attached; the correlation id stays available
/// through [`get_correlation_id`].
///
/// # Errors
///
/// [`LoggerError::MissingRequestId`] if the context has no request id,
/// [`LoggerError::InvalidRequestId`] if it is not a string. The entry is
/// never produced without the field.
pub fn entry_from_context<'a, L>(ctx: &RequestContext, logger: &'a L) -> Result<FieldEntry<'a>>
where
    L: FieldLogger + ?Sized,
{
    let request_id = match ctx.get(REQUEST_ID) {
        None => return Err(LoggerError::missing_request_id(REQUEST_ID)),
        Some(FieldValue::String(id)) => id.clone(),
        Some(other) => return Err(LoggerError::invalid_request_id(REQUEST_ID, other.kind())),
    };

    Ok(logger.with_fields(LogContext::new().with_field(REQUEST_ID, request_id)))
}
