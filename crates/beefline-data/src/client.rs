//! HTTP client for the Beefline API.

use std::sync::Arc;

use beefline_search::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::FetchError;
use crate::retry::RetryPolicy;
use crate::timeout::TimeoutConfig;

/// Storage key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// JSON API client with timeouts, retries and bearer authentication.
///
/// ```rust,ignore
/// let client = ApiClient::new("http://localhost:8000/api", TimeoutConfig::default())?
///     .with_retry(RetryPolicy::new(2))
///     .with_token_store(store);
/// let page: PaginatedResponse<Listing> = client.get_json(url).await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    token_store: Option<Arc<dyn KeyValueStore>>,
}

impl ApiClient {
    /// Create a client for an API base URL.
    pub fn new(base_url: impl Into<String>, timeout: TimeoutConfig) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;

        let http = reqwest::Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.total)
            .build()?;

        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
            token_store: None,
        })
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Read the bearer token from a store on every request.
    pub fn with_token_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer_token(&self) -> Option<String> {
        let store = self.token_store.as_ref()?;
        match store.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read auth token");
                None
            }
        }
    }

    /// GET a URL and decode the JSON body, retrying per the policy.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if self.retry.should_retry(&err, attempt) => {
                    let delay = self.retry.backoff.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        tracing::debug!(url = %url, "GET");

        let mut request = self.http.get(url);
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
