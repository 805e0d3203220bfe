//! Provider connectors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use zilstream_core::{Address, Network, ProviderKind};

use crate::bridge::{InjectedWallet, SessionWallet};
use crate::error::{WalletError, WalletResult};

/// A successful connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConnection {
    pub address: Address,
    pub network: Network,
    pub kind: ProviderKind,
}

/// Connects one kind of wallet provider.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn connect(&self) -> WalletResult<WalletConnection>;
}

// ============================================================================
// ZilPay
// ============================================================================

/// Connector for the injected ZilPay bridge.
#[derive(Clone, Default)]
pub struct ZilPayConnector {
    bridge: Option<Arc<dyn InjectedWallet>>,
}

impl ZilPayConnector {
    pub fn new(bridge: Option<Arc<dyn InjectedWallet>>) -> Self {
        Self { bridge }
    }

    pub fn is_available(&self) -> bool {
        self.bridge.is_some()
    }
}

#[async_trait]
impl WalletConnector for ZilPayConnector {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ZilPay
    }

    async fn connect(&self) -> WalletResult<WalletConnection> {
        let bridge = self
            .bridge
            .as_ref()
            .ok_or(WalletError::ProviderUnavailable(ProviderKind::ZilPay))?;

        if !bridge.connect().await {
            info!("ZilPay connection declined");
            return Err(WalletError::UserRejected);
        }

        if !bridge.is_connected() {
            return Err(WalletError::SessionMismatch(
                "connect accepted but bridge reports disconnected".to_string(),
            ));
        }
        let account = bridge.default_account().ok_or_else(|| {
            WalletError::SessionMismatch("no default account".to_string())
        })?;
        let address = Address::parse(&account)?;

        let reported = bridge.network();
        let network = reported.parse::<Network>().unwrap_or_else(|_| {
            warn!(network = %reported, "Unknown network reported, assuming mainnet");
            Network::Mainnet
        });

        debug!(%address, %network, "ZilPay connected");
        Ok(WalletConnection {
            address,
            network,
            kind: ProviderKind::ZilPay,
        })
    }
}

// ============================================================================
// Zeeves
// ============================================================================

/// Connector for the Zeeves session bridge. Always mainnet.
#[derive(Clone, Default)]
pub struct ZeevesConnector {
    bridge: Option<Arc<dyn SessionWallet>>,
}

impl ZeevesConnector {
    pub fn new(bridge: Option<Arc<dyn SessionWallet>>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl WalletConnector for ZeevesConnector {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Zeeves
    }

    async fn connect(&self) -> WalletResult<WalletConnection> {
        let bridge = self
            .bridge
            .as_ref()
            .ok_or(WalletError::ProviderUnavailable(ProviderKind::Zeeves))?;

        let session = bridge.get_session().await.map_err(|reason| {
            info!(%reason, "Zeeves session refused");
            WalletError::UserRejected
        })?;
        let address = Address::parse(&session.bech32)?;

        debug!(%address, "Zeeves connected");
        Ok(WalletConnection {
            address,
            network: Network::Mainnet,
            kind: ProviderKind::Zeeves,
        })
    }
}
