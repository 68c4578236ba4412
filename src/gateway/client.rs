//! Shared request executor used by every provider client.
//!
//! Every call goes through the same route: rate-limiter admission, cache
//! lookup (GET only), network call, outcome classification. Successful GET
//! bodies are cached when the caller asks for it; failures never are.

use std::time::Duration;

use bytes::Bytes;
use mediagate_common::{GatewayError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::cache::{cache_key, ResponseCache};
use super::query::QueryParams;
use super::rate_limit::RateLimiter;
use crate::config::RateLimitConfig;

/// Construction parameters for a [`GatewayClient`].
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Short provider label used in logs (e.g. `"tmdb"`).
    pub provider: &'static str,
    /// Base URL every path is appended to.
    pub base_url: String,
    /// Parameters attached to every request (e.g. an API key).
    pub default_query: QueryParams,
    /// Provider-specific headers attached to every request.
    pub headers: Vec<(HeaderName, String)>,
    pub timeout: Duration,
    pub rate_limit: RateLimitConfig,
    /// Fallback TTL for cache writes without their own TTL.
    pub default_ttl: Duration,
}

impl GatewayOptions {
    pub fn new(provider: &'static str, base_url: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            default_query: QueryParams::new(),
            headers: Vec::new(),
            timeout: Duration::from_secs(30),
            rate_limit: RateLimitConfig::default(),
            default_ttl: Duration::ZERO,
        }
    }
}

/// Rate-limited, cache-aware HTTP client for one upstream provider.
#[derive(Debug)]
pub struct GatewayClient {
    provider: &'static str,
    http: Client,
    base_url: String,
    default_query: QueryParams,
    headers: HeaderMap,
    limiter: RateLimiter,
    cache: ResponseCache,
}

impl GatewayClient {
    /// Build a client. Fails only when a configured header value contains
    /// control characters. Non-ASCII text is sent as raw UTF-8 bytes.
    pub fn new(options: GatewayOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &options.headers {
            let value = HeaderValue::from_bytes(value.as_bytes()).map_err(|e| {
                GatewayError::unknown(None, format!("invalid {name} header value: {e}"))
            })?;
            headers.insert(name.clone(), value);
        }

        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Ok(Self {
            provider: options.provider,
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            default_query: options.default_query,
            headers,
            limiter: RateLimiter::from_config(&options.rate_limit),
            cache: ResponseCache::new(options.default_ttl),
        })
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Full URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` without caching the response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: QueryParams) -> Result<T> {
        self.get_cached(path, params, None).await
    }

    /// GET `path`, serving from and populating the response cache.
    ///
    /// `ttl` of `None` or zero falls back to the cache's default TTL.
    pub async fn get_cached<T: DeserializeOwned>(
        &self,
        path: &str,
        params: QueryParams,
        ttl: Option<Duration>,
    ) -> Result<T> {
        self.limiter.acquire().await;

        let params = params.with_defaults(&self.default_query);
        let key = cache_key(&self.base_url, path, &params);

        if let Some(payload) = self.cache.get(&key) {
            trace!(provider = self.provider, path = %path, "cache hit");
            return self.decode(path, &payload, None);
        }

        debug!(provider = self.provider, path = %path, "GET");
        let request = self
            .http
            .get(self.url(path))
            .headers(self.headers.clone())
            .query(&params);
        let (status, payload) = self.execute(path, request).await?;

        let value = self.decode(path, &payload, Some(status))?;
        self.cache.set(key, payload, ttl);
        Ok(value)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<T, B>(&self, path: &str, body: &B, extra_headers: HeaderMap) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.limiter.acquire().await;

        debug!(provider = self.provider, path = %path, "POST");
        let mut headers = self.headers.clone();
        headers.extend(extra_headers);
        let request = self
            .http
            .post(self.url(path))
            .headers(headers)
            .query(&self.default_query)
            .json(body);
        let (status, payload) = self.execute(path, request).await?;

        self.decode(path, &payload, Some(status))
    }

    /// POST without a body, ignoring the response payload.
    pub async fn post_empty(&self, path: &str, params: QueryParams) -> Result<()> {
        self.limiter.acquire().await;

        debug!(provider = self.provider, path = %path, "POST");
        let params = params.with_defaults(&self.default_query);
        let request = self
            .http
            .post(self.url(path))
            .headers(self.headers.clone())
            .query(&params);
        self.execute(path, request).await?;

        Ok(())
    }

    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<(u16, Bytes)> {
        let response = request
            .send()
            .await
            .map_err(|e| classify_transport(self.provider, path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                provider = self.provider,
                path = %path,
                status = status.as_u16(),
                "upstream returned an error status"
            );
            return Err(GatewayError::from_status(
                Some(status.as_u16()),
                format!("{} {} returned {}: {}", self.provider, path, status, body),
            ));
        }

        let payload = response.bytes().await.map_err(|e| {
            GatewayError::unknown(
                Some(status.as_u16()),
                format!("{} {}: failed to read body: {}", self.provider, path, e),
            )
        })?;

        Ok((status.as_u16(), payload))
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, payload: &[u8], status: Option<u16>) -> Result<T> {
        // Endpoints answering 204 decode as unit or an empty collection.
        let payload: &[u8] = if payload.is_empty() { b"null" } else { payload };
        serde_json::from_slice(payload).map_err(|e| {
            GatewayError::unknown(
                status,
                format!("{} {}: failed to decode response: {}", self.provider, path, e),
            )
        })
    }
}

/// Normalize a transport-level failure (no response or unreadable response).
fn classify_transport(provider: &str, path: &str, err: reqwest::Error) -> GatewayError {
    let message = format!("{provider} {path}: {err}");
    if err.is_timeout() {
        return GatewayError::unknown(None, message);
    }
    GatewayError::from_status(err.status().map(|s| s.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagate_common::ErrorKind;

    #[test]
    fn invalid_header_value_is_rejected() {
        let mut options = GatewayOptions::new("test", "http://localhost");
        options
            .headers
            .push((HeaderName::from_static("x-test"), "bad\nvalue".to_string()));
        let err = GatewayClient::new(options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn non_ascii_header_value_is_sent_as_utf8() {
        let mut options = GatewayOptions::new("test", "http://localhost");
        options
            .headers
            .push((HeaderName::from_static("x-test"), "Salon télé".to_string()));
        let client = GatewayClient::new(options).unwrap();
        assert_eq!(
            client.headers.get("x-test").map(|v| v.as_bytes()),
            Some("Salon télé".as_bytes())
        );
    }

    #[test]
    fn base_url_is_normalized() {
        let client = GatewayClient::new(GatewayOptions::new("test", "http://localhost:8096/")).unwrap();
        assert_eq!(client.url("/System/Info"), "http://localhost:8096/System/Info");
        assert_eq!(client.provider(), "test");
    }

    #[tokio::test]
    async fn unreachable_host_is_invalid_url() {
        let mut options = GatewayOptions::new("test", "http://127.0.0.1:1");
        options.timeout = Duration::from_secs(5);
        let client = GatewayClient::new(options).unwrap();

        let err = client
            .get::<serde_json::Value>("/anything", QueryParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
        assert_eq!(err.status(), None);
    }
}
