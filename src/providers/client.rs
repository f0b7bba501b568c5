use std::fmt;
use std::time::Duration;

use log::{debug, error, warn};
use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::app_config::Config;
use crate::errors::{ApiError, ApiErrorKind};

use super::responses::CacheMode;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Response budget requested from both endpoints
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// How failed requests are retried.
///
/// Serialized as the integers 0..=3 used by the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RetryMode {
    /// One attempt, no retry
    #[default]
    NoRetry,
    /// At most two attempts
    RetryOnce,
    /// Retry until success
    RetryForever,
    /// Retry until success, delaying before every attempt including the first
    DelayEveryAttempt,
}

impl RetryMode {
    /// Maximum number of attempts, `None` when unbounded
    pub fn max_attempts(self) -> Option<u32> {
        match self {
            Self::NoRetry => Some(1),
            Self::RetryOnce => Some(2),
            Self::RetryForever | Self::DelayEveryAttempt => None,
        }
    }

    /// Whether the configured delay applies before attempt number `attempt` (0-based)
    pub fn delays_before(self, attempt: u32) -> bool {
        attempt > 0 || self == Self::DelayEveryAttempt
    }
}

impl TryFrom<u8> for RetryMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NoRetry),
            1 => Ok(Self::RetryOnce),
            2 => Ok(Self::RetryForever),
            3 => Ok(Self::DelayEveryAttempt),
            other => Err(format!("retry mode must be between 0 and 3, got {}", other)),
        }
    }
}

impl From<RetryMode> for u8 {
    fn from(mode: RetryMode) -> Self {
        match mode {
            RetryMode::NoRetry => 0,
            RetryMode::RetryOnce => 1,
            RetryMode::RetryForever => 2,
            RetryMode::DelayEveryAttempt => 3,
        }
    }
}

/// Which failures the retry loop may try again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryScope {
    /// Transport failures and HTTP error statuses
    AnyFailure,
    /// Transport failures only; an HTTP error status is returned after one attempt
    TransportOnly,
}

impl RetryScope {
    pub fn allows(self, err: &ApiError) -> bool {
        match self {
            Self::AnyFailure => err.is_retryable(),
            Self::TransportOnly => err.kind == ApiErrorKind::Network,
        }
    }
}

impl fmt::Display for RetryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// HTTP client for one translation session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client for API requests
    client: Client,
    /// Chat completions URL as configured
    pub(crate) api_url: String,
    /// Bearer credential, empty when the endpoint needs none
    api_key: String,
    /// Model identifier
    pub(crate) model: String,
    user_agent: String,
    retry_mode: RetryMode,
    /// Pause inserted before retried attempts
    delay: Duration,
    pub(crate) cache_mode: CacheMode,
    pub(crate) temperature: f32,
}

impl ApiClient {
    /// Create a client with no retry, no delay and caching enabled
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Self::build_http_client(Duration::from_secs(60)),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_mode: RetryMode::default(),
            delay: Duration::ZERO,
            cache_mode: CacheMode::default(),
            temperature: 0.0,
        }
    }

    /// Create a client from the persisted configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.api_key.clone(), config.model.clone())
            .retry_policy(config.retry_mode, Duration::from_millis(config.delay_ms))
            .user_agent(config.user_agent.clone())
            .cache_mode(config.context_cache_mode)
            .temperature(config.temperature)
            .timeout(Duration::from_secs(config.timeout_secs))
    }

    fn build_http_client(timeout: Duration) -> Client {
        match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to build HTTP client with a {:?} timeout, requests will not time out: {}", timeout, e);
                Client::new()
            }
        }
    }

    /// Set the retry mode and the fixed inter-attempt delay
    pub fn retry_policy(mut self, retry_mode: RetryMode, delay: Duration) -> Self {
        self.retry_mode = retry_mode;
        self.delay = delay;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Per-request transport timeout; the retry loop itself has no deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = Self::build_http_client(timeout);
        self
    }

    fn build_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Ok(value) = header::HeaderValue::from_str(&self.user_agent) {
            headers.insert(header::USER_AGENT, value);
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if !self.api_key.is_empty() {
            if let Ok(value) = header::HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
                headers.insert(header::AUTHORIZATION, value);
            }
        }
        headers
    }

    /// POST `payload` to `url`, retrying per the configured policy.
    ///
    /// `scope` decides whether HTTP error statuses are retried along with
    /// transport failures. An unparseable success body is returned immediately.
    pub async fn request_with_retry<T: Serialize + Sync + ?Sized>(
        &self,
        url: &str,
        payload: &T,
        scope: RetryScope,
    ) -> Result<Value, ApiError> {
        let mut attempts: u32 = 0;

        loop {
            if self.retry_mode.delays_before(attempts) && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            debug!("POST {} (attempt {})", url, attempts + 1);
            let err = match self.send_once(url, payload).await {
                Ok(value) => return Ok(value),
                Err(err) if scope.allows(&err) => err,
                Err(err) => {
                    error!("Translation API request failed: {}", err);
                    return Err(err);
                }
            };

            attempts += 1;
            if let Some(max) = self.retry_mode.max_attempts() {
                if attempts >= max {
                    error!("Translation API request failed after {} attempt(s): {}", attempts, err);
                    return Err(err);
                }
            }
            warn!("Translation API request failed (attempt {}): {} - retrying", attempts, err);
        }
    }

    async fn send_once<T: Serialize + Sync + ?Sized>(&self, url: &str, payload: &T) -> Result<Value, ApiError> {
        let response = self
            .client
            .post(url)
            .headers(self.build_headers())
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        serde_json::from_str::<Value>(&body).map_err(|e| {
            ApiError::new(
                ApiErrorKind::InvalidJson,
                format!("Failed to parse response JSON: {}", e),
            )
        })
    }

    /// Normalise an HTTP error response into an `ApiError`
    async fn provider_error(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let payload = serde_json::from_str::<Value>(&body).unwrap_or_else(|_| {
            let reason = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.clone()
            };
            json!({ "error": { "message": reason } })
        });

        let message = payload
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("API responded with status {}", status.as_u16()));

        ApiError::new(ApiErrorKind::Provider { status: status.as_u16() }, message).with_payload(payload)
    }
}
