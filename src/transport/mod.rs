//! Synchronous HTTP capability
//!
//! The core only needs "send a request, get status, headers and body back".
//! Timeouts, TLS and socket handling live behind [`Transport`].
//!
//! Non-success statuses are ordinary responses. A transport only fails when
//! the exchange itself could not complete.

mod memory;
mod ureq_transport;

pub use memory::{MemoryRemoteStore, ScriptedTransport};
pub use ureq_transport::UreqTransport;

use std::fmt;
use std::sync::Arc;

use crate::errors::SyncResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Header list with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets a header, replacing any existing value with the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.0.push((name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value, with empty values treated as absent
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).filter(|v| !v.is_empty())
    }
}

/// Blocking request/response exchange
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> SyncResult<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> SyncResult<HttpResponse> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> SyncResult<HttpResponse> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = HttpResponse::new(200, "{}").with_header("ETag", "etag-1");
        assert_eq!(resp.header("etag"), Some("etag-1"));
        assert_eq!(resp.header("ETAG"), Some("etag-1"));
    }

    #[test]
    fn test_empty_header_counts_as_missing() {
        let resp = HttpResponse::new(200, "{}").with_header("ETag", "");
        assert_eq!(resp.header("ETag"), None);
    }

    #[test]
    fn test_set_replaces_existing_header() {
        let req = HttpRequest::new(Method::Put, "http://x")
            .header("If-Match", "a")
            .header("if-match", "b");
        assert_eq!(req.headers.get("If-Match"), Some("b"));
        assert_eq!(req.headers.iter().count(), 1);
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(304, "").is_success());
        assert!(!HttpResponse::new(412, "").is_success());
    }
}
