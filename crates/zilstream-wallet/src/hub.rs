//! Routes connect requests to providers and records the provider used.

use std::sync::Arc;

use tracing::{info, warn};

use zilstream_core::ProviderKind;
use zilstream_persistence::StateArchive;

use crate::avatar::{AvatarClient, AvatarConnector};
use crate::bridge::{InjectedWallet, SessionWallet};
use crate::connector::{WalletConnection, WalletConnector, ZeevesConnector, ZilPayConnector};
use crate::error::{WalletError, WalletResult};

pub struct WalletHub {
    zilpay: ZilPayConnector,
    zeeves: ZeevesConnector,
    avatar: AvatarClient,
    archive: StateArchive,
}

impl WalletHub {
    pub fn new(
        zilpay: Option<Arc<dyn InjectedWallet>>,
        zeeves: Option<Arc<dyn SessionWallet>>,
        avatar: AvatarClient,
        archive: StateArchive,
    ) -> Self {
        Self {
            zilpay: ZilPayConnector::new(zilpay),
            zeeves: ZeevesConnector::new(zeeves),
            avatar,
            archive,
        }
    }

    /// Whether an injected ZilPay bridge is present.
    pub fn has_zilpay(&self) -> bool {
        self.zilpay.is_available()
    }

    /// Connect with `kind`. Avatar logins reuse the stored avatar name.
    pub async fn connect(&self, kind: ProviderKind) -> WalletResult<WalletConnection> {
        match kind {
            ProviderKind::ZilPay => self.finish(&self.zilpay).await,
            ProviderKind::Zeeves => self.finish(&self.zeeves).await,
            ProviderKind::Avatar => {
                let name = self
                    .archive
                    .load_avatar()
                    .ok_or(WalletError::ProviderUnavailable(ProviderKind::Avatar))?;
                self.connect_avatar(&name).await
            }
        }
    }

    /// Re-open an existing ZilPay session without changing the recorded
    /// provider.
    pub async fn reconnect_zilpay(&self) -> WalletResult<WalletConnection> {
        let connection = self.zilpay.connect().await?;
        info!(address = %connection.address, "ZilPay session restored");
        Ok(connection)
    }

    /// Log in with an avatar name and remember it.
    pub async fn connect_avatar(&self, name: &str) -> WalletResult<WalletConnection> {
        let connector = AvatarConnector::new(self.avatar.clone(), name);
        let connection = self.finish(&connector).await?;
        self.archive.save_avatar(connector.name())?;
        Ok(connection)
    }

    async fn finish(&self, connector: &dyn WalletConnector) -> WalletResult<WalletConnection> {
        let kind = connector.kind();
        let connection = connector.connect().await.map_err(|e| {
            warn!(provider = %kind, error = %e, "Wallet connection failed");
            e
        })?;

        self.archive.save_provider(kind)?;
        info!(
            provider = %kind,
            address = %connection.address,
            network = %connection.network,
            "Wallet connected"
        );
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::WatchWallet;
    use zilstream_core::{Address, Network};
    use zilstream_persistence::MemoryStore;

    fn archive() -> StateArchive {
        StateArchive::new(Arc::new(MemoryStore::new()))
    }

    fn hub(archive: StateArchive, zilpay: bool) -> WalletHub {
        let address = Address::from_hex("0x00000000000000000000000000000000000000ef").unwrap();
        let bridge: Option<Arc<dyn InjectedWallet>> = if zilpay {
            Some(Arc::new(WatchWallet::new(address, Network::Mainnet)))
        } else {
            None
        };
        WalletHub::new(
            bridge,
            None,
            AvatarClient::new("http://127.0.0.1:9").unwrap(),
            archive,
        )
    }

    #[tokio::test]
    async fn test_connect_persists_provider_flag() {
        let archive = archive();
        let hub = hub(archive.clone(), true);
        assert!(hub.has_zilpay());

        hub.connect(ProviderKind::ZilPay).await.unwrap();
        assert_eq!(archive.load_zilpay_flag(), Some(true));
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_flag_untouched() {
        let archive = archive();
        let hub = hub(archive.clone(), false);

        assert!(hub.connect(ProviderKind::ZilPay).await.is_err());
        assert!(hub.connect(ProviderKind::Zeeves).await.is_err());
        assert_eq!(archive.load_zilpay_flag(), None);
    }

    #[tokio::test]
    async fn test_reconnect_keeps_recorded_provider() {
        let archive = archive();
        archive.save_provider(ProviderKind::Avatar).unwrap();
        let hub = hub(archive.clone(), true);

        let connection = hub.reconnect_zilpay().await.unwrap();
        assert_eq!(connection.kind, ProviderKind::ZilPay);
        assert_eq!(archive.load_zilpay_flag(), Some(false));

        let missing = self::hub(archive.clone(), false);
        assert!(missing.reconnect_zilpay().await.is_err());
        assert_eq!(archive.load_zilpay_flag(), Some(false));
    }

    #[tokio::test]
    async fn test_avatar_without_stored_name() {
        let hub = hub(archive(), false);
        assert!(matches!(
            hub.connect(ProviderKind::Avatar).await,
            Err(WalletError::ProviderUnavailable(ProviderKind::Avatar))
        ));
    }
}
