//! Logging configuration from command-line flags and environment variables
//!
//! | Flag                 | Environment        | Default |
//! |----------------------|--------------------|---------|
//! | `--log-host-url`     | `LOG_HOST_URL`     | empty   |
//! | `--log-enable-sniff` | `LOG_SNIFF`        | false   |
//! | `--log-prefix`       | `LOG_INDEX_PREFIX` | empty   |
//! | `--log-host-name`    | `LOG_HOST_NAME`    | empty   |
//! | `--log-enable`       | `LOG_ENABLE`       | false   |
//! | `--log-level`        | `LOG_LEVEL`        | debug   |
//!
//! Flags win over environment variables. The switches accept the usual
//! boolean spellings in the environment (`1`/`0`, `true`/`false`, `yes`/`no`,
//! `on`/`off`); an empty value is rejected like any other invalid one.
//!
//! Arguments that are not logging flags are ignored, so the host program can
//! parse its own flags from the same command line.

use crate::core::{LogContext, LogLevel, LoggerError, Result};
use crate::indexing::IndexNamer;
use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::ffi::OsString;

/// Flags that take a value, as `--flag value` or `--flag=value`
const VALUE_FLAGS: [&str; 4] = ["--log-host-url", "--log-prefix", "--log-host-name", "--log-level"];
const SWITCH_FLAGS: [&str; 2] = ["--log-enable-sniff", "--log-enable"];
const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

/// Characters Elasticsearch does not allow in index names
const FORBIDDEN_INDEX_CHARS: [char; 11] = ['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' '];

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "pllog", about = "Logging options", disable_version_flag = true)]
pub struct LogConfig {
    /// URL of the Elasticsearch node log records are shipped to
    #[arg(long = "log-host-url", env = "LOG_HOST_URL", default_value = "")]
    pub host_url: String,

    /// Discover the other nodes of the cluster at startup
    #[arg(
        long = "log-enable-sniff",
        env = "LOG_SNIFF",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub sniff: bool,

    /// Prefix of the daily index names
    #[arg(long = "log-prefix", env = "LOG_INDEX_PREFIX", default_value = "")]
    pub index_prefix: String,

    /// Host name recorded in every shipped document
    #[arg(long = "log-host-name", env = "LOG_HOST_NAME", default_value = "")]
    pub host_name: String,

    /// Ship log records to Elasticsearch
    #[arg(
        long = "log-enable",
        env = "LOG_ENABLE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub enable: bool,

    /// Minimum level of records shipped to Elasticsearch
    #[arg(long = "log-level", env = "LOG_LEVEL", default_value = "debug")]
    pub level: LogLevel,
}

impl LogConfig {
    /// Parse the process arguments and environment
    ///
    /// Prints help and exits with code 0 on `--help`, prints the error and
    /// exits with code 1 on invalid input.
    pub fn from_args_or_exit() -> Self {
        Self::parse_args_or_exit(std::env::args_os())
    }

    /// [`LogConfig::from_args_or_exit`] over an explicit argument list
    pub fn parse_args_or_exit<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        match Self::try_from_args(args) {
            Ok(config) => config,
            Err(err) => {
                let _ = err.print();
                std::process::exit(exit_code(err.kind()));
            }
        }
    }

    /// Parse `args` (the first item is the program name) and the environment
    pub fn try_from_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(known_args(args))
    }

    /// Check the fields the enabled mode depends on
    ///
    /// A disabled configuration is always valid.
    pub fn validate(&self) -> Result<()> {
        if !self.enable {
            return Ok(());
        }

        let url = self.host_url.trim();
        if url.is_empty() {
            return Err(LoggerError::config("LogConfig", "log host url is required when logging is enabled"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LoggerError::config(
                "LogConfig",
                format!("log host url '{}' must start with http:// or https://", url),
            ));
        }

        if self.index_prefix.is_empty() {
            return Err(LoggerError::config("LogConfig", "index prefix is required when logging is enabled"));
        }
        if self.index_prefix.chars().any(|c| c.is_uppercase() || FORBIDDEN_INDEX_CHARS.contains(&c))
            || self.index_prefix.starts_with(['-', '_', '+'])
        {
            return Err(LoggerError::config(
                "LogConfig",
                format!("index prefix '{}' is not a valid Elasticsearch index name", self.index_prefix),
            ));
        }

        Ok(())
    }

    pub fn index_namer(&self) -> IndexNamer {
        IndexNamer::new(self.index_prefix.clone())
    }

    /// Configuration as log fields, for the startup record
    pub fn to_fields(&self) -> LogContext {
        LogContext::new()
            .with_field("host_url", self.host_url.as_str())
            .with_field("sniff", self.sniff)
            .with_field("index_prefix", self.index_prefix.as_str())
            .with_field("host_name", self.host_name.as_str())
            .with_field("level", self.level.to_str())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            host_url: String::new(),
            sniff: false,
            index_prefix: String::new(),
            host_name: String::new(),
            enable: false,
            level: LogLevel::Debug,
        }
    }
}

/// Process exit code for a failed parse: 0 when help was requested
fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Keep the program name, the logging flags (with their values) and help
/// flags; drop everything else
fn known_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut kept: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str() else {
            continue;
        };

        if text == "--" {
            break;
        }

        if VALUE_FLAGS.contains(&text) {
            kept.push(arg.clone());
            if let Some(value) = args.next() {
                kept.push(value);
            }
        } else if VALUE_FLAGS
            .iter()
            .any(|flag| text.strip_prefix(flag).is_some_and(|rest| rest.starts_with('=')))
            || SWITCH_FLAGS.contains(&text)
            || HELP_FLAGS.contains(&text)
        {
            kept.push(arg.clone());
        }
    }

    kept
}
