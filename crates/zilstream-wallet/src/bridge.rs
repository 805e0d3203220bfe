//! Host-provided wallet bridges.
//!
//! A bridge is whatever the host exposes for a wallet extension or app.
//! Connectors only talk to these traits, so the CLI can plug in a watch
//! address and tests can plug in fakes.

use async_trait::async_trait;

use zilstream_core::{Address, Network};

/// Injected browser-style wallet (ZilPay).
#[async_trait]
pub trait InjectedWallet: Send + Sync {
    /// Ask the user to connect. `false` when the request was declined.
    async fn connect(&self) -> bool;

    fn is_connected(&self) -> bool;

    /// Bech32 address of the active account.
    fn default_account(&self) -> Option<String>;

    /// Network name as reported by the wallet (`mainnet`, `testnet`, ...).
    fn network(&self) -> String;
}

/// Session returned by a session-based wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    /// Bech32 address of the session account.
    pub bech32: String,
}

/// Session-based wallet (Zeeves).
#[async_trait]
pub trait SessionWallet: Send + Sync {
    /// Open or resume a session. `Err` carries the wallet's reason.
    async fn get_session(&self) -> Result<WalletSession, String>;
}

/// Injected bridge that always reports a fixed address.
///
/// Used by the CLI to track a wallet without a browser extension.
#[derive(Debug, Clone)]
pub struct WatchWallet {
    address: Address,
    network: Network,
}

impl WatchWallet {
    pub fn new(address: Address, network: Network) -> Self {
        Self { address, network }
    }
}

#[async_trait]
impl InjectedWallet for WatchWallet {
    async fn connect(&self) -> bool {
        true
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn default_account(&self) -> Option<String> {
        Some(self.address.to_string())
    }

    fn network(&self) -> String {
        self.network.to_string()
    }
}
