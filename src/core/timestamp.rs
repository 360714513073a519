//! Timestamp formatting for log output

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp format used by the appenders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// RFC 3339 with as many fractional digits as needed, always UTC:
    /// `2025-01-08T10:30:45.123456789Z`
    ///
    /// This is the `@timestamp` format of indexed documents.
    Rfc3339Nanos,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Rfc3339Nanos => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_format() {
        assert_eq!(
            TimestampFormat::Iso8601.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123Z"
        );
    }

    #[test]
    fn test_rfc3339_nanos_format() {
        assert_eq!(
            TimestampFormat::Rfc3339Nanos.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123456Z"
        );

        let whole_second = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).single().unwrap();
        assert_eq!(
            TimestampFormat::Rfc3339Nanos.format(&whole_second),
            "2024-03-05T00:00:00Z"
        );
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01/08 10:30");
    }
}
