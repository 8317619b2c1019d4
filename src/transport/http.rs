//! HTTP transport for Nominatim-compatible geocoding services.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Overview/>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use tracing::debug;

use super::traits::Transport;
use crate::types::{RequestDescriptor, Response};
use crate::{GeocodeError, Result};

/// Default base URL of the public OpenStreetMap Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body echoed back in an [`GeocodeError::Api`] message.
const MAX_ERROR_BODY: usize = 200;

/// Transport that performs real HTTP requests with `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
    user_agent: String,
}

impl HttpTransport {
    /// Create a transport for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, user_agent, DEFAULT_TIMEOUT)
    }

    /// Create a transport with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| GeocodeError::Configuration(format!("invalid base URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GeocodeError::Configuration(format!(
                "invalid base URL {base_url:?}: scheme must be http or https"
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        })
    }

    /// Map a non-success status to a classified error.
    async fn error_for_status(response: reqwest::Response) -> GeocodeError {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return GeocodeError::RateLimited { retry_after };
        }

        let body = response.text().await.unwrap_or_default();
        let body = body.trim();
        let message = if body.is_empty() {
            status.to_string()
        } else {
            let mut snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            if snippet.len() < body.len() {
                snippet.push('…');
            }
            format!("{status}: {snippet}")
        };
        GeocodeError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path());
        debug!(method = %request.method(), %url, "sending request");

        let response = self
            .http
            .request(request.method().clone(), &url)
            .header(USER_AGENT, &self.user_agent)
            .query(request.params())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;

        Ok(Response {
            status,
            content_type,
            body,
        })
    }
}
