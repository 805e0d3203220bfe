//! Avatar login: resolve a username to a wallet address.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use zilstream_core::{Address, Network, ProviderKind};

use crate::connector::{WalletConnection, WalletConnector};
use crate::error::{WalletError, WalletResult};

/// Default timeout for avatar lookups.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct AvatarResponse {
    #[serde(default)]
    address: Option<String>,
}

/// HTTP client for the avatar service.
#[derive(Clone)]
pub struct AvatarClient {
    client: Client,
    base_url: String,
}

impl AvatarClient {
    pub fn new(base_url: impl Into<String>) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| WalletError::Lookup(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Look up the wallet registered for `name`.
    pub async fn lookup(&self, name: &str) -> WalletResult<Address> {
        let url = format!("{}/{}", self.base_url, name.trim());
        info!(%url, "Looking up avatar");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WalletError::Lookup(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WalletError::AvatarNotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Lookup(format!("HTTP {status}: {body}")));
        }

        let body: AvatarResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Lookup(format!("Failed to parse response: {e}")))?;

        let hex = body
            .address
            .filter(|a| !a.trim().is_empty())
            .ok_or(WalletError::AvatarNotFound)?;
        let address = Address::from_hex(hex.trim())?;

        debug!(name, %address, "Avatar resolved");
        Ok(address)
    }
}

/// Read-only connection for one avatar name. Always mainnet.
pub struct AvatarConnector {
    client: AvatarClient,
    name: String,
}

impl AvatarConnector {
    pub fn new(client: AvatarClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl WalletConnector for AvatarConnector {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Avatar
    }

    async fn connect(&self) -> WalletResult<WalletConnection> {
        let address = self.client.lookup(&self.name).await?;
        Ok(WalletConnection {
            address,
            network: Network::Mainnet,
            kind: ProviderKind::Avatar,
        })
    }
}
