//! Async REST client for the Nexus API.

use std::time::Duration;

use nexus_common::config::ApiConfig;
use nexus_common::error::{NexusError, NexusResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Error body returned by the Nexus API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    retry_after_ms: Option<u64>,
}

/// Thin wrapper over `reqwest` that speaks the Nexus error format.
///
/// ```rust,no_run
/// use nexus_client::RestClient;
/// use nexus_common::config::ApiConfig;
///
/// # fn main() -> nexus_common::error::NexusResult<()> {
/// let rest = RestClient::new(&ApiConfig {
///     base_url: "https://nexus.example/api/v1".into(),
///     token: Some("mytoken".into()),
///     timeout_secs: 30,
/// })?;
/// # let _ = rest;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ApiConfig) -> NexusResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            let token = if token.starts_with("Bot ") {
                token.clone()
            } else {
                format!("Bot {token}")
            };
            let value = HeaderValue::from_str(&token)
                .map_err(|_| NexusError::invalid("api token contains invalid header characters"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NexusError::Internal(e.into()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> NexusResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "nexus api request");

        let mut req = self.client.request(method, &url);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await.map_err(transport_error)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let header_retry = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = resp.json::<ErrorBody>().await.unwrap_or_default();
        Err(status_error(status, body, header_retry))
    }

    async fn request<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<&Value>) -> NexusResult<T> {
        let resp = self.send(method, path, body).await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|e| NexusError::Internal(e.into()));
        }
        resp.json::<T>().await.map_err(|e| NexusError::Internal(e.into()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> NexusResult<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> NexusResult<T> {
        let body = serde_json::to_value(body).map_err(|e| NexusError::Internal(e.into()))?;
        self.request(Method::POST, path, Some(&body)).await
    }

    /// PATCH, discarding the response body.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> NexusResult<()> {
        let body = serde_json::to_value(body).map_err(|e| NexusError::Internal(e.into()))?;
        self.send(Method::PATCH, path, Some(&body)).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> NexusResult<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }
}

/// Network-level failures are all worth another attempt.
fn transport_error(e: reqwest::Error) -> NexusError {
    NexusError::Transient {
        message: e.to_string(),
    }
}

/// `Retry-After` in seconds, integral or fractional.
fn parse_retry_after(value: &str) -> Option<u64> {
    let secs: f64 = value.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| (secs * 1000.0).ceil() as u64)
}

fn status_error(status: StatusCode, body: ErrorBody, header_retry_ms: Option<u64>) -> NexusError {
    let message = body
        .message
        .or(body.error)
        .unwrap_or_else(|| status.to_string());
    match NexusError::from_status(status.as_u16(), message) {
        NexusError::RateLimited { retry_after_ms } => NexusError::RateLimited {
            retry_after_ms: body.retry_after_ms.or(header_retry_ms).unwrap_or(retry_after_ms),
        },
        other => other,
    }
}
