//! Upstream Forwarder Module
//!
//! Owns the HTTP client used to reach the fixed upstream target and the URL
//! assembly for forwarded requests.

use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderMap, Method};
use reqwest::{Client, Url};

use crate::error::Result;

// == Hop-By-Hop Headers ==
/// Headers that describe a single connection rather than the request itself.
/// They are stripped from forwarded requests and relayed responses.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Removes hop-by-hop headers from a header map in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

// == Upstream Forwarder ==
/// Forwards requests to the fixed upstream origin.
///
/// The inbound path and query are appended to the upstream origin verbatim
/// (identity path rewrite); only the origin changes.
#[derive(Debug, Clone)]
pub struct UpstreamForwarder {
    /// Shared client; holds the connection pool and the request timeout
    client: Client,
    /// Upstream origin, e.g. `https://lmarena.ai`
    origin: String,
}

impl UpstreamForwarder {
    // == Constructor ==
    /// Creates a forwarder for the given upstream base URL.
    ///
    /// Fails on an unparseable or host-less URL, which aborts startup.
    pub fn new(upstream_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let url = Url::parse(upstream_url)
            .with_context(|| format!("invalid upstream URL: {upstream_url}"))?;
        if !url.has_host() {
            anyhow::bail!("upstream URL has no host: {upstream_url}");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("failed to build upstream HTTP client")?;

        Ok(Self {
            client,
            // "https://host[:port]" with default ports elided
            origin: url.origin().ascii_serialization(),
        })
    }

    // == Target URL ==
    /// Builds the absolute upstream URL for a raw path+query as received.
    fn target_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.origin, path_and_query)
    }

    // == Forward ==
    /// Sends the request upstream, preserving method, headers and body.
    ///
    /// `Host` is dropped so the client derives it from the upstream origin
    /// ("change origin" semantics); hop-by-hop headers are stripped. Transport
    /// failures, including the request timeout, surface as gateway errors.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        mut headers: HeaderMap,
        body: reqwest::Body,
    ) -> Result<reqwest::Response> {
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);

        let response = self
            .client
            .request(method, self.target_url(path_and_query))
            .headers(headers)
            .body(body)
            .send()
            .await?;

        Ok(response)
    }
}
