// src/transport.rs
//! Outbound requests: a reqwest-backed client and a canned-body stand-in.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT,
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{Method, SourceConfig};
use crate::source::SourceId;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/93.0.4577.63 Safari/537.36";
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

fn configured_headers(source: &SourceConfig) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (k, v) in &source.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("{}: header name `{k}`", source.id))?;
        let value = HeaderValue::from_str(v)
            .with_context(|| format!("{}: header value for `{k}`", source.id))?;
        map.insert(name, value);
    }
    Ok(map)
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().build().context("building http client")?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the request for `source` without sending it.
    ///
    /// GET pages get browser-like headers with a `Referer` of the page itself; POST
    /// APIs get a JSON body. Configured headers win over the defaults.
    pub fn request(&self, source: &SourceConfig) -> Result<reqwest::RequestBuilder> {
        let configured = configured_headers(source)?;
        let rb = match source.method {
            Method::Get => {
                let mut headers = HeaderMap::new();
                headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
                headers.insert(
                    ACCEPT_LANGUAGE,
                    HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
                );
                headers.insert(
                    REFERER,
                    HeaderValue::from_str(&source.url).context("referer from url")?,
                );
                headers.extend(configured);
                self.client.get(&source.url).headers(headers)
            }
            Method::Post => {
                let mut headers = configured;
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                let payload = source
                    .payload
                    .as_ref()
                    .ok_or_else(|| anyhow!("{}: POST source without payload", source.id))?;
                let body = serde_json::to_vec(payload).context("serializing payload")?;
                self.client.post(&source.url).headers(headers).body(body)
            }
        };
        Ok(rb.timeout(self.timeout))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse> {
        let id = source.id;
        tracing::debug!(
            target: "fetch",
            source = %id,
            url = %source.url,
            method = ?source.method,
            "request"
        );

        let resp = self
            .request(source)?
            .send()
            .await
            .with_context(|| format!("{id} http {:?} {}", source.method, source.url))?;

        let status = resp.status();
        if !status.is_success() {
            // Body still goes to extraction; API sources fall back to the sentinel on bad JSON.
            tracing::warn!(
                target: "fetch",
                source = %id,
                status = status.as_u16(),
                "non-success status"
            );
        }
        let body = resp
            .text()
            .await
            .with_context(|| format!("{id} http .text()"))?;

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Serves fixed bodies per source; unknown sources fail like a refused connection.
#[derive(Debug, Clone, Default)]
pub struct FixtureTransport {
    bodies: HashMap<SourceId, String>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: SourceId, body: impl Into<String>) -> Self {
        self.bodies.insert(id, body.into());
        self
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse> {
        let body = self
            .bodies
            .get(&source.id)
            .ok_or_else(|| anyhow!("{}: no fixture (connection refused)", source.id))?;
        Ok(RawResponse {
            status: 200,
            body: body.clone(),
        })
    }
}
