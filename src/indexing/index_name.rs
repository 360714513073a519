//! Daily index naming

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Computes `{prefix}-{YYYY-MM-DD}` index names
///
/// Dates are taken in local time, so a record lands in the index of the day
/// it was emitted on the host clock.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use pllog::IndexNamer;
///
/// let namer = IndexNamer::new("app-logs");
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(namer.name_for_date(date), "app-logs-2024-03-05");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNamer {
    prefix: String,
}

impl IndexNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name_for_date(&self, date: NaiveDate) -> String {
        format!("{}-{}", self.prefix, date.format("%Y-%m-%d"))
    }

    /// Index for the local calendar day of `instant`
    pub fn name_for(&self, instant: &DateTime<Utc>) -> String {
        self.name_for_date(instant.with_timezone(&Local).date_naive())
    }

    /// Index for today
    pub fn current(&self) -> String {
        self.name_for_date(Local::now().date_naive())
    }
}
