//! Indexing backend: index naming and the Elasticsearch client

pub mod client;
pub mod index_name;

pub use client::{BulkRequest, ElasticClient};
pub use index_name::IndexNamer;
