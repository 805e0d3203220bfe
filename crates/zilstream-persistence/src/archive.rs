//! Typed load/save of persisted state slices.
//!
//! Blobs that fail to parse are logged and treated as absent; a broken file
//! never prevents startup.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use zilstream_core::{
    AccountState, Address, AlertState, NotificationState, ProviderKind, SettingsState,
};

use crate::error::PersistenceResult;
use crate::kv::KeyValueStore;

/// Storage keys.
pub mod keys {
    pub const ACCOUNT: &str = "account";
    pub const ALERTS: &str = "alerts";
    pub const SETTINGS: &str = "settings";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const FAVORITES: &str = "favorites";
    pub const SELECTED_CURRENCY: &str = "selectedCurrency";
    /// `"true"` when the active provider is ZilPay, `"false"` otherwise.
    pub const ZILPAY: &str = "zilpay";
    pub const AVATAR: &str = "avatar";
}

/// Typed access to persisted state.
#[derive(Clone)]
pub struct StateArchive {
    store: Arc<dyn KeyValueStore>,
}

impl StateArchive {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted state");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable persisted state");
                None
            }
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> PersistenceResult<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)?;
        debug!(key, bytes = json.len(), "Persisted state");
        Ok(())
    }

    /// Load the account. Every wallet comes back disconnected; with nothing
    /// stored the default account (mainnet, no wallets) is returned.
    pub fn load_account(&self) -> AccountState {
        let mut account: AccountState = self.load_json(keys::ACCOUNT).unwrap_or_default();
        account.initialized = true;
        account.mark_all_disconnected();
        account
    }

    pub fn save_account(&self, account: &AccountState) -> PersistenceResult<()> {
        self.save_json(keys::ACCOUNT, account)
    }

    pub fn load_alerts(&self) -> AlertState {
        let mut alerts: AlertState = self.load_json(keys::ALERTS).unwrap_or_default();
        alerts.initialized = true;
        alerts
    }

    pub fn save_alerts(&self, alerts: &AlertState) -> PersistenceResult<()> {
        self.save_json(keys::ALERTS, alerts)
    }

    pub fn load_settings(&self) -> SettingsState {
        let mut settings: SettingsState = self.load_json(keys::SETTINGS).unwrap_or_default();
        settings.initialized = true;
        settings
    }

    pub fn save_settings(&self, settings: &SettingsState) -> PersistenceResult<()> {
        self.save_json(keys::SETTINGS, settings)
    }

    pub fn load_notifications(&self) -> NotificationState {
        let mut state: NotificationState =
            self.load_json(keys::NOTIFICATIONS).unwrap_or_default();
        state.initialized = true;
        state
    }

    pub fn save_notifications(&self, state: &NotificationState) -> PersistenceResult<()> {
        self.save_json(keys::NOTIFICATIONS, state)
    }

    /// Favorited token addresses, stored comma separated. Invalid entries
    /// are skipped.
    pub fn load_favorites(&self) -> Vec<Address> {
        let raw = match self.store.get(keys::FAVORITES) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read favorites");
                return Vec::new();
            }
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| match Address::parse(s) {
                Ok(a) => Some(a),
                Err(e) => {
                    debug!(entry = s, error = %e, "Skipping invalid favorite");
                    None
                }
            })
            .collect()
    }

    pub fn save_favorites(&self, favorites: &[Address]) -> PersistenceResult<()> {
        let joined = favorites
            .iter()
            .map(Address::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.store.set(keys::FAVORITES, &joined)
    }

    pub fn load_selected_currency(&self) -> Option<String> {
        self.store
            .get(keys::SELECTED_CURRENCY)
            .ok()
            .flatten()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
    }

    pub fn save_selected_currency(&self, code: &str) -> PersistenceResult<()> {
        self.store.set(keys::SELECTED_CURRENCY, &code.to_uppercase())
    }

    /// Remember which provider connected last.
    pub fn save_provider(&self, kind: ProviderKind) -> PersistenceResult<()> {
        let is_zilpay = matches!(kind, ProviderKind::ZilPay);
        self.store.set(keys::ZILPAY, if is_zilpay { "true" } else { "false" })
    }

    /// `Some(true)` when ZilPay was the last provider.
    pub fn load_zilpay_flag(&self) -> Option<bool> {
        match self.store.get(keys::ZILPAY).ok().flatten()?.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn save_avatar(&self, name: &str) -> PersistenceResult<()> {
        self.store.set(keys::AVATAR, name)
    }

    pub fn load_avatar(&self) -> Option<String> {
        self.store.get(keys::AVATAR).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use rust_decimal_macros::dec;
    use zilstream_core::{Alert, Indicator, Metric, Network, Wallet};

    fn archive() -> StateArchive {
        StateArchive::new(Arc::new(MemoryStore::new()))
    }

    fn address(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_reload_marks_wallets_disconnected() {
        let archive = archive();
        let mut wallet = Wallet::new(address(1), ProviderKind::ZilPay);
        wallet.is_connected = true;
        let account = AccountState {
            initialized: true,
            network: Network::Testnet,
            wallets: vec![wallet.clone(), Wallet {
                is_connected: true,
                ..Wallet::new(address(2), ProviderKind::Avatar)
            }],
            selected_wallet: Some(wallet),
        };
        archive.save_account(&account).unwrap();

        let loaded = archive.load_account();
        assert!(loaded.initialized);
        assert_eq!(loaded.network, Network::Testnet);
        assert_eq!(loaded.wallets.len(), 2);
        assert!(loaded.wallets.iter().all(|w| !w.is_connected));
        assert!(!loaded.selected_wallet.unwrap().is_connected);
    }

    #[test]
    fn test_missing_account_is_default() {
        let loaded = archive().load_account();
        assert!(loaded.initialized);
        assert_eq!(loaded.network, Network::Mainnet);
        assert!(loaded.wallets.is_empty());
        assert!(loaded.selected_wallet.is_none());
    }

    #[test]
    fn test_corrupt_blob_treated_as_absent() {
        let archive = archive();
        archive.store().set(keys::ALERTS, "{not json").unwrap();
        let alerts = archive.load_alerts();
        assert!(alerts.initialized);
        assert!(alerts.alerts.is_empty());
    }

    #[test]
    fn test_alerts_roundtrip() {
        let archive = archive();
        let mut state = AlertState::default();
        state.alerts.push(Alert::new(address(3), Metric::Price, Indicator::Below, dec!(0.1)));
        archive.save_alerts(&state).unwrap();

        let loaded = archive.load_alerts();
        assert_eq!(loaded.alerts, state.alerts);
    }

    #[test]
    fn test_favorites_skip_invalid() {
        let archive = archive();
        let good = address(4);
        archive
            .store()
            .set(keys::FAVORITES, &format!("{},garbage,,", good))
            .unwrap();
        assert_eq!(archive.load_favorites(), vec![good.clone()]);

        archive.save_favorites(&[good.clone(), address(5)]).unwrap();
        assert_eq!(archive.load_favorites().len(), 2);
    }

    #[test]
    fn test_provider_flag() {
        let archive = archive();
        assert_eq!(archive.load_zilpay_flag(), None);
        archive.save_provider(ProviderKind::ZilPay).unwrap();
        assert_eq!(archive.load_zilpay_flag(), Some(true));
        archive.save_provider(ProviderKind::Zeeves).unwrap();
        assert_eq!(archive.load_zilpay_flag(), Some(false));
    }

    #[test]
    fn test_selected_currency_uppercased() {
        let archive = archive();
        assert_eq!(archive.load_selected_currency(), None);
        archive.save_selected_currency("eur").unwrap();
        assert_eq!(archive.load_selected_currency().as_deref(), Some("EUR"));
    }
}
