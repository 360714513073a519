//! Blocking HTTP client for the Elasticsearch REST API
//!
//! Only the three endpoints the logging hook needs are spoken: the root
//! endpoint for the startup health check, `_nodes/http` for sniffing and
//! `_bulk` for shipping documents.

use crate::core::{LoggerError, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection to an Elasticsearch cluster
///
/// Requests rotate round-robin over the known nodes. Without sniffing the
/// only node is the configured URL.
///
/// Construction performs network I/O and uses the blocking reqwest client,
/// so it must run on a plain thread, not inside an async runtime.
#[derive(Debug)]
pub struct ElasticClient {
    http: Client,
    nodes: Vec<String>,
    next: AtomicUsize,
}

impl ElasticClient {
    /// Connect to `url`, optionally discovering the cluster's other nodes
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::ClientConstruction`] if the URL is unusable, the
    /// node does not answer the health check, or sniffing finds no node.
    pub fn connect(url: &str, sniff: bool) -> Result<Self> {
        let base = normalize_url(url)?;
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LoggerError::client_construction(&base, e.to_string()))?;

        let nodes = if sniff {
            Self::sniff(&http, &base)?
        } else {
            vec![base]
        };

        let client = Self {
            http,
            nodes,
            next: AtomicUsize::new(0),
        };
        client.ping()?;
        Ok(client)
    }

    fn sniff(http: &Client, base: &str) -> Result<Vec<String>> {
        let url = format!("{}/_nodes/http", base);
        let response = http
            .get(&url)
            .send()
            .map_err(|e| LoggerError::client_construction(base, format!("sniffing failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LoggerError::client_construction(
                base,
                format!("sniffing failed with status {}", response.status()),
            ));
        }

        let info: NodesInfo = response
            .json()
            .map_err(|e| LoggerError::client_construction(base, format!("bad sniff response: {}", e)))?;
        let nodes = info.http_urls(scheme_of(base));

        if nodes.is_empty() {
            return Err(LoggerError::client_construction(
                base,
                "no Elasticsearch node available",
            ));
        }
        Ok(nodes)
    }

    /// Health check: every known node must answer its root endpoint
    fn ping(&self) -> Result<()> {
        for node in &self.nodes {
            let response = self
                .http
                .get(node)
                .send()
                .map_err(|e| LoggerError::client_construction(node, e.to_string()))?;

            if !response.status().is_success() {
                return Err(LoggerError::client_construction(
                    node,
                    format!("health check returned status {}", response.status()),
                ));
            }
        }
        Ok(())
    }

    /// Base URLs of the nodes requests are sent to
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    fn next_node(&self) -> &str {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        &self.nodes[idx]
    }

    /// Send a bulk request
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::HttpError`] on transport failure and
    /// [`LoggerError::Indexing`] when the cluster rejects the request or any
    /// of its documents. Nothing is retried.
    pub fn bulk(&self, request: &BulkRequest) -> Result<()> {
        if request.is_empty() {
            return Ok(());
        }

        let url = format!("{}/_bulk", self.next_node());
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(request.body.clone())
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(LoggerError::indexing(
                request.indices(),
                format!("bulk request returned status {}: {}", status, truncate(&body, 200)),
            ));
        }

        let parsed: BulkResponse = serde_json::from_str(&body)?;
        parsed.into_result(&request.indices())
    }
}

/// NDJSON body of a `_bulk` request, one `index` action per document
#[derive(Debug, Default, Clone)]
pub struct BulkRequest {
    body: String,
    indices: Vec<String>,
    count: usize,
}

impl BulkRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: &str, document: &serde_json::Value) -> Result<()> {
        let action = serde_json::json!({ "index": { "_index": index } });
        self.body.push_str(&serde_json::to_string(&action)?);
        self.body.push('\n');
        self.body.push_str(&serde_json::to_string(document)?);
        self.body.push('\n');

        if !self.indices.iter().any(|i| i == index) {
            self.indices.push(index.to_string());
        }
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Target indices, comma separated, for error messages
    pub fn indices(&self) -> String {
        self.indices.join(",")
    }
}

#[derive(Debug, Deserialize)]
struct NodesInfo {
    #[serde(default)]
    nodes: HashMap<String, NodeInfo>,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    http: Option<NodeHttp>,
}

#[derive(Debug, Deserialize)]
struct NodeHttp {
    publish_address: String,
}

impl NodesInfo {
    /// `publish_address` is either `ip:port` or `hostname/ip:port`
    fn http_urls(&self, scheme: &str) -> Vec<String> {
        let mut urls: Vec<String> = self
            .nodes
            .values()
            .filter_map(|node| node.http.as_ref())
            .map(|http| {
                let addr = http
                    .publish_address
                    .rsplit_once('/')
                    .map_or(http.publish_address.as_str(), |(_, addr)| addr);
                format!("{}://{}", scheme, addr)
            })
            .collect();
        urls.sort();
        urls.dedup();
        urls
    }
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl BulkResponse {
    fn into_result(self, indices: &str) -> Result<()> {
        if !self.errors {
            return Ok(());
        }

        let failures: Vec<serde_json::Value> = self
            .items
            .into_iter()
            .flat_map(|item| item.into_values())
            .filter_map(|item| item.error)
            .collect();

        let reason = failures
            .first()
            .and_then(|e| e.get("reason"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error");

        Err(LoggerError::indexing(
            indices,
            format!("{} documents rejected, first: {}", failures.len(), reason),
        ))
    }
}

fn normalize_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(LoggerError::client_construction(
            url,
            "URL must start with http:// or https://",
        ))
    }
}

fn scheme_of(url: &str) -> &str {
    url.split_once("://").map_or("http", |(scheme, _)| scheme)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("http://localhost:9200/").unwrap(), "http://localhost:9200");
        assert_eq!(normalize_url(" https://es.internal ").unwrap(), "https://es.internal");
        assert!(matches!(
            normalize_url("localhost:9200"),
            Err(LoggerError::ClientConstruction { .. })
        ));
    }

    #[test]
    fn test_bulk_request_body() {
        let mut request = BulkRequest::new();
        request
            .push("app-logs-2024-03-05", &serde_json::json!({"Message": "one"}))
            .unwrap();
        request
            .push("app-logs-2024-03-05", &serde_json::json!({"Message": "two"}))
            .unwrap();

        let lines: Vec<&str> = request.body().lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"index":{"_index":"app-logs-2024-03-05"}}"#);
        assert_eq!(lines[3], r#"{"Message":"two"}"#);
        assert!(request.body().ends_with('\n'));
        assert_eq!(request.len(), 2);
        assert_eq!(request.indices(), "app-logs-2024-03-05");
    }

    #[test]
    fn test_sniff_response_parsing() {
        let info: NodesInfo = serde_json::from_value(serde_json::json!({
            "nodes": {
                "a": { "http": { "publish_address": "10.0.0.2:9200" } },
                "b": { "http": { "publish_address": "es-1.internal/10.0.0.1:9200" } },
                "c": {}
            }
        }))
        .unwrap();

        assert_eq!(
            info.http_urls("https"),
            vec!["https://10.0.0.1:9200", "https://10.0.0.2:9200"]
        );
    }

    #[test]
    fn test_bulk_response_without_errors() {
        let response: BulkResponse = serde_json::from_str(
            r#"{"took":3,"errors":false,"items":[{"index":{"_index":"x","status":201}}]}"#,
        )
        .unwrap();
        assert!(response.into_result("x").is_ok());
    }

    #[test]
    fn test_bulk_response_with_errors() {
        let response: BulkResponse = serde_json::from_str(
            r#"{"took":3,"errors":true,"items":[
                {"index":{"_index":"x","status":201}},
                {"index":{"_index":"x","status":400,"error":{"type":"mapper_parsing_exception","reason":"failed to parse field [Data.n]"}}}
            ]}"#,
        )
        .unwrap();

        let err = response.into_result("x").unwrap_err();
        assert!(err.to_string().contains("1 documents rejected"));
        assert!(err.to_string().contains("failed to parse field [Data.n]"));
    }

    #[test]
    fn test_connect_refused_is_construction_error() {
        let result = ElasticClient::connect("http://127.0.0.1:1", false);
        assert!(matches!(result, Err(LoggerError::ClientConstruction { .. })));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
