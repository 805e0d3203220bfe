//! Token list client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use zilstream_core::TokenInfo;

use crate::error::{FeedError, FeedResult};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the token API (`GET {api_url}/tokens`).
#[derive(Clone)]
pub struct TokenApiClient {
    client: Client,
    api_url: String,
}

impl TokenApiClient {
    pub fn new(api_url: impl Into<String>) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch every listed token.
    pub async fn fetch_tokens(&self) -> FeedResult<Vec<TokenInfo>> {
        let url = format!("{}/tokens", self.api_url);
        debug!(%url, "Fetching tokens");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::HttpClient(format!("HTTP {status}: {body}")));
        }

        let tokens: Vec<TokenInfo> = response
            .json()
            .await
            .map_err(|e| FeedError::HttpClient(format!("Failed to parse response: {e}")))?;

        info!(count = tokens.len(), "Fetched tokens");
        Ok(tokens)
    }
}
