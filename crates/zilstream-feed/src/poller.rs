//! Data poller.
//!
//! Every refresh is an idempotent fetch-and-replace that returns the
//! actions to dispatch. A failed fetch is logged at `warn`, counted, and
//! produces no actions, so the previous state stays in place until the next
//! scheduled attempt.

use std::sync::Arc;

use tracing::{debug, warn};

use zilstream_core::{Address, Operator, TokenInfo, TokenState, TokenUpdate};
use zilstream_store::Action;
use zilstream_telemetry::Metrics;

use crate::batch::PortfolioBatch;
use crate::error::FeedResult;
use crate::source::{ChainSource, RateSource, TokenSource};

/// On-chain contracts queried by the balance batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContracts {
    pub dex: Address,
    pub staking: Address,
    /// Address the token API uses for native ZIL.
    pub native_token: Address,
}

pub struct DataPoller {
    tokens: Arc<dyn TokenSource>,
    rates: Arc<dyn RateSource>,
    chain: Arc<dyn ChainSource>,
    contracts: ChainContracts,
}

impl DataPoller {
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        rates: Arc<dyn RateSource>,
        chain: Arc<dyn ChainSource>,
        contracts: ChainContracts,
    ) -> Self {
        Self {
            tokens,
            rates,
            chain,
            contracts,
        }
    }

    pub fn contracts(&self) -> &ChainContracts {
        &self.contracts
    }

    /// Record the outcome of one fetch; failures become `None`.
    fn observe<T>(source: &str, result: FeedResult<T>) -> Option<T> {
        match result {
            Ok(v) => {
                Metrics::poll_ok(source);
                Some(v)
            }
            Err(e) => {
                Metrics::poll_failed(source);
                warn!(source, error = %e, "Fetch failed");
                None
            }
        }
    }

    /// Refresh the token list.
    ///
    /// The first load replaces the list (`TokenInit`); later loads update
    /// known tokens in place and append new ones. An empty list is ignored.
    pub async fn refresh_tokens(&self, current: &TokenState) -> Vec<Action> {
        let Some(mut fetched) = Self::observe("tokens", self.tokens.fetch_tokens().await) else {
            return Vec::new();
        };
        if fetched.is_empty() {
            debug!("Token API returned no tokens");
            return Vec::new();
        }

        for token in &mut fetched {
            token.is_zil = token.address_bech32 == self.contracts.native_token;
        }

        if !current.initialized {
            return vec![Action::TokenInit(fetched)];
        }

        fetched
            .into_iter()
            .map(|token| match current.get(&token.address_bech32) {
                Some(_) => Action::TokenUpdate(TokenUpdate::from(&token)),
                None => Action::TokenAdd(token),
            })
            .collect()
    }

    pub async fn refresh_rates(&self) -> Vec<Action> {
        match Self::observe("rates", self.rates.fetch_rates().await) {
            Some(rates) if !rates.is_empty() => vec![Action::RatesUpdated(rates)],
            _ => Vec::new(),
        }
    }

    pub async fn refresh_block_height(&self) -> Vec<Action> {
        match Self::observe("block", self.chain.block_height().await) {
            Some(height) => {
                Metrics::block_height(height);
                vec![Action::BlockHeightUpdated(height)]
            }
            None => Vec::new(),
        }
    }

    /// Balances, pool positions and delegations of `wallet` in one batch.
    pub async fn refresh_balances(
        &self,
        wallet: &Address,
        tokens: &[TokenInfo],
        operators: &[Operator],
    ) -> Vec<Action> {
        let batch = self
            .batch(wallet)
            .native_balance(&self.contracts.native_token)
            .token_balances(tokens)
            .pools(tokens)
            .delegations(operators.iter().map(|o| &o.address));
        self.run(wallet, "balances", batch).await
    }

    /// Delegations of `wallet` only.
    pub async fn refresh_staking(&self, wallet: &Address, operators: &[Operator]) -> Vec<Action> {
        if operators.is_empty() {
            return Vec::new();
        }
        let batch = self
            .batch(wallet)
            .delegations(operators.iter().map(|o| &o.address));
        self.run(wallet, "staking", batch).await
    }

    fn batch(&self, wallet: &Address) -> PortfolioBatch {
        PortfolioBatch::new(
            wallet.clone(),
            self.contracts.dex.clone(),
            self.contracts.staking.clone(),
        )
    }

    async fn run(&self, wallet: &Address, source: &str, batch: PortfolioBatch) -> Vec<Action> {
        let requests = batch.requests();
        let Some(responses) = Self::observe(source, self.chain.send_batch(&requests).await) else {
            return Vec::new();
        };
        let actions = batch.process(responses);
        debug!(%wallet, source, requests = requests.len(), actions = actions.len(), "Batch processed");
        actions
    }
}
