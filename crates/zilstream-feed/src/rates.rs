//! ZIL fiat rate client.
//!
//! Expects the CoinGecko `simple/price` shape:
//! `{"zilliqa": {"usd": 0.05, "eur": 0.046}}`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use tracing::debug;

use zilstream_core::CurrencyRate;

use crate::error::{FeedError, FeedResult};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Asset id of ZIL at the rates provider.
const ZIL_ID: &str = "zilliqa";

#[derive(Clone)]
pub struct RateClient {
    client: Client,
    rates_url: String,
    currencies: Vec<String>,
}

impl RateClient {
    /// `currencies` are fiat codes; USD is always requested.
    pub fn new(rates_url: impl Into<String>, currencies: &[String]) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        let mut codes = vec!["usd".to_string()];
        for code in currencies.iter().map(|c| c.to_lowercase()) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }

        Ok(Self {
            client,
            rates_url: rates_url.into(),
            currencies: codes,
        })
    }

    /// Fetch the ZIL rate in every configured currency.
    pub async fn fetch_rates(&self) -> FeedResult<Vec<CurrencyRate>> {
        let vs = self.currencies.join(",");
        debug!(url = %self.rates_url, currencies = %vs, "Fetching rates");

        let response = self
            .client
            .get(&self.rates_url)
            .query(&[("ids", ZIL_ID), ("vs_currencies", vs.as_str())])
            .send()
            .await
            .map_err(|e| FeedError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::HttpClient(format!("HTTP {status}: {body}")));
        }

        let mut body: HashMap<String, HashMap<String, Decimal>> = response
            .json()
            .await
            .map_err(|e| FeedError::HttpClient(format!("Failed to parse response: {e}")))?;

        let prices = body
            .remove(ZIL_ID)
            .ok_or_else(|| FeedError::InvalidResponse(format!("missing {ZIL_ID} entry")))?;

        let mut rates: Vec<CurrencyRate> = prices
            .into_iter()
            .map(|(code, rate)| CurrencyRate::new(code, rate))
            .collect();
        rates.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rates)
    }
}
