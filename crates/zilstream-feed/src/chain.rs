//! Zilliqa JSON-RPC client.
//!
//! Requests are sent as one batch; responses may come back in any order and
//! are matched by `id`.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{FeedError, FeedResult};

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// One JSON-RPC call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub id: u64,
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

/// One JSON-RPC result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResponse {
    pub id: u64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Clone)]
pub struct ChainClient {
    client: Client,
    rpc_url: String,
}

impl ChainClient {
    pub fn new(rpc_url: impl Into<String>) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, body: &impl Serialize) -> FeedResult<T> {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(body)
            .send()
            .await
            .map_err(|e| FeedError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::HttpClient(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::HttpClient(format!("Failed to parse response: {e}")))
    }

    /// Send a batch. An empty batch is not sent.
    pub async fn send_batch(&self, requests: &[RpcRequest]) -> FeedResult<Vec<RpcResponse>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = requests.len(), "Sending RPC batch");
        self.post(&requests).await
    }

    /// Current transaction block count.
    pub async fn block_height(&self) -> FeedResult<u64> {
        let request = RpcRequest::new(1, "GetNumTxBlocks", Value::Array(Vec::new()));
        let response: RpcResponse = self.post(&request).await?;

        if let Some(err) = response.error {
            return Err(FeedError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        match response.result {
            Some(Value::String(s)) => s
                .parse()
                .map_err(|e| FeedError::InvalidResponse(format!("block height {s}: {e}"))),
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| FeedError::InvalidResponse(format!("block height {n}"))),
            other => Err(FeedError::InvalidResponse(format!(
                "unexpected block height result: {other:?}"
            ))),
        }
    }
}
