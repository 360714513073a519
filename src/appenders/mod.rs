//! Appender implementations

pub mod console;
pub mod elasticsearch;

pub use console::{ConsoleAppender, ConsoleTarget};
pub use elasticsearch::ElasticsearchAppender;

pub use crate::core::Appender;
