//! Console appender implementation

use crate::core::{Appender, LogEntry, OutputFormat, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

/// Standard stream a [`ConsoleAppender`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// Writes one line per record to stdout or stderr
///
/// Write failures (closed pipe, full disk behind a redirect) are discarded:
/// console output never fails the caller.
pub struct ConsoleAppender {
    target: ConsoleTarget,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleAppender {
    pub fn new(target: ConsoleTarget) -> Self {
        Self {
            target,
            use_colors: cfg!(feature = "console"),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleTarget::Stderr)
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set the output format for this appender
    ///
    /// # Example
    ///
    /// ```
    /// use pllog::appenders::ConsoleAppender;
    /// use pllog::OutputFormat;
    ///
    /// let appender = ConsoleAppender::stdout().with_output_format(OutputFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.output_format {
            OutputFormat::Text if self.use_colors => self.format_colored(entry),
            _ => self.output_format.format(entry, &self.timestamp_format),
        }
    }

    #[cfg(feature = "console")]
    fn format_colored(&self, entry: &LogEntry) -> String {
        let level = format!("{:5}", entry.level.to_str()).color(entry.level.color_code());
        let base = format!(
            "[{}] [{}] {} - {}",
            self.timestamp_format.format(&entry.timestamp),
            level,
            entry.thread_label(),
            entry.escaped_message()
        );

        if entry.fields.is_empty() {
            base
        } else {
            format!("{} {}", base, entry.fields.format_fields())
        }
    }

    #[cfg(not(feature = "console"))]
    fn format_colored(&self, entry: &LogEntry) -> String {
        self.output_format.format(entry, &self.timestamp_format)
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = self.render(entry);
        let _ = match self.target {
            ConsoleTarget::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            ConsoleTarget::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let _ = match self.target {
            ConsoleTarget::Stdout => std::io::stdout().flush(),
            ConsoleTarget::Stderr => std::io::stderr().flush(),
        };
        Ok(())
    }

    fn name(&self) -> &str {
        match self.target {
            ConsoleTarget::Stdout => "console",
            ConsoleTarget::Stderr => "console-stderr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};

    #[test]
    fn test_plain_render_matches_output_format() {
        let appender = ConsoleAppender::stdout().with_colors(false);
        let entry = LogEntry::new(LogLevel::Warn, "disk low".to_string())
            .with_fields(LogContext::new().with_field("free_mb", 12));

        let line = appender.render(&entry);
        assert!(line.contains("[WARN ]"));
        assert!(line.ends_with("disk low free_mb=12"));
    }

    #[test]
    fn test_append_never_fails() {
        let mut appender = ConsoleAppender::stderr().with_output_format(OutputFormat::Json);
        let entry = LogEntry::new(LogLevel::Info, "hello".to_string());

        assert!(appender.append(&entry).is_ok());
        assert!(appender.flush().is_ok());
        assert_eq!(appender.name(), "console-stderr");
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_colored_render_stays_on_one_line() {
        let appender = ConsoleAppender::stdout().with_colors(true);
        let entry = LogEntry::new(LogLevel::Error, "boom\r\nINFO forged".to_string());

        let line = appender.render(&entry);
        assert_eq!(line.lines().count(), 1);
        assert!(line.contains("boom\\r\\nINFO forged"));
    }
}
