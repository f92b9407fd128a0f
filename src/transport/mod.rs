//! # Transport
//!
//! The client consumes a generic blocking HTTP capability:
//! `send(request) -> status + body`. TLS, pooling and timeouts belong to the
//! implementation.
//!
//! - [`HttpTransport`] - real implementation on `reqwest::blocking`
//! - [`MockTransport`] - scripted responses for tests and offline use

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockResponse, MockTransport};

use serde_json::Value;
use thiserror::Error;

use crate::catalog::HttpMethod;
use crate::errors::ChemSpiderError;

/// A fully-built outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Already-serialized query pairs
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Look up a header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query value
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, used as the error message on failures
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connection-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),
}

impl From<TransportError> for ChemSpiderError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(message) => ChemSpiderError::Timeout(message),
            TransportError::Connection(message) => ChemSpiderError::Transport(message),
        }
    }
}

/// Blocking HTTP client capability
///
/// Shared across threads by the client, proxies and background searches.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "https://api.rsc.org/compounds/v1/lookups/datasources".into(),
            headers: vec![("apikey".into(), "k".into())],
            query: vec![("fields".into(), "SMILES".into())],
            body: None,
        };
        assert_eq!(request.header("APIKEY"), Some("k"));
        assert_eq!(request.query_value("fields"), Some("SMILES"));
        assert_eq!(request.query_value("start"), None);
    }

    #[test]
    fn test_success_range() {
        let ok = HttpResponse {
            status: 204,
            reason: String::new(),
            body: vec![],
        };
        let err = HttpResponse {
            status: 404,
            reason: "Not Found".into(),
            body: vec![],
        };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
