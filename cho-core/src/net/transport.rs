//! The outbound HTTP contract.
//!
//! The core never talks to the network directly. It posts byte bodies
//! through this trait and reads back status, headers, and body.
//! Timeout and proxy policy belong to the injected implementation, not
//! to this layer. Implementations must not retry internally.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ChoError;

/// The user agent the server expects from real clients.
pub const USER_AGENT: &str = "osu!";

// ── HttpResponse ─────────────────────────────────────────────────

/// A completed HTTP exchange as seen by the core.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

// ── HttpTransport ────────────────────────────────────────────────

/// POST bytes, get status + headers + bytes back. Suspends the caller
/// until the exchange completes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: Bytes,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ChoError>;
}

// ── ReqwestTransport ─────────────────────────────────────────────

/// Default transport backed by a shared [`reqwest::Client`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the protocol-mandated user agent.
    pub fn new() -> Result<Self, ChoError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with a custom timeout.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: Bytes,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ChoError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await?;

        let status = response.status().as_u16();
        let mut header_map = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                header_map.insert(name.as_str().to_ascii_lowercase(), value.to_owned());
            }
        }
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers: header_map,
            body,
        })
    }
}
