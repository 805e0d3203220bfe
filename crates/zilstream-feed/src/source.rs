//! Fetch seams used by the poller.

use async_trait::async_trait;

use zilstream_core::{CurrencyRate, TokenInfo};

use crate::chain::{ChainClient, RpcRequest, RpcResponse};
use crate::error::FeedResult;
use crate::rates::RateClient;
use crate::tokens::TokenApiClient;

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_tokens(&self) -> FeedResult<Vec<TokenInfo>>;
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> FeedResult<Vec<CurrencyRate>>;
}

#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn send_batch(&self, requests: &[RpcRequest]) -> FeedResult<Vec<RpcResponse>>;

    async fn block_height(&self) -> FeedResult<u64>;
}

#[async_trait]
impl TokenSource for TokenApiClient {
    async fn fetch_tokens(&self) -> FeedResult<Vec<TokenInfo>> {
        TokenApiClient::fetch_tokens(self).await
    }
}

#[async_trait]
impl RateSource for RateClient {
    async fn fetch_rates(&self) -> FeedResult<Vec<CurrencyRate>> {
        RateClient::fetch_rates(self).await
    }
}

#[async_trait]
impl ChainSource for ChainClient {
    async fn send_batch(&self, requests: &[RpcRequest]) -> FeedResult<Vec<RpcResponse>> {
        ChainClient::send_batch(self, requests).await
    }

    async fn block_height(&self) -> FeedResult<u64> {
        ChainClient::block_height(self).await
    }
}
