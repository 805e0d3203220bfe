//! State slices held by the store.
//!
//! Every slice is plain data; transitions live in the store crate. Slices
//! that are persisted carry an `initialized` flag so nothing is written back
//! before the stored copy has been loaded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::{Network, Wallet};
use crate::address::Address;
use crate::alert::Alert;
use crate::settings::{CurrencyRate, Notification, NotificationPermission};
use crate::staking::Operator;
use crate::token::TokenInfo;

/// Maximum notifications kept in history.
pub const MAX_NOTIFICATIONS: usize = 50;

/// Default fiat currency.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Chain progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockchainState {
    pub block_height: Option<u64>,
}

/// Connected wallets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub selected_wallet: Option<Wallet>,
}

impl AccountState {
    /// Address of the selected wallet.
    pub fn selected_address(&self) -> Option<&Address> {
        self.selected_wallet.as_ref().map(|w| &w.address)
    }

    pub fn wallet(&self, address: &Address) -> Option<&Wallet> {
        self.wallets.iter().find(|w| &w.address == address)
    }

    /// Mark every wallet disconnected. Connections never survive a reload.
    pub fn mark_all_disconnected(&mut self) {
        for w in &mut self.wallets {
            w.is_connected = false;
        }
        if let Some(w) = &mut self.selected_wallet {
            w.is_connected = false;
        }
    }
}

/// Tracked tokens and the ZIL/USD rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenState {
    pub initialized: bool,
    /// USD per ZIL.
    pub zil_rate: Decimal,
    pub tokens: Vec<TokenInfo>,
}

impl TokenState {
    pub fn get(&self, address: &Address) -> Option<&TokenInfo> {
        self.tokens.iter().find(|t| &t.address_bech32 == address)
    }

    pub fn get_mut(&mut self, address: &Address) -> Option<&mut TokenInfo> {
        self.tokens.iter_mut().find(|t| &t.address_bech32 == address)
    }

    /// The native ZIL token, if loaded.
    pub fn native(&self) -> Option<&TokenInfo> {
        self.tokens.iter().find(|t| t.is_zil)
    }
}

/// Fiat rates of ZIL and the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyState {
    pub currencies: Vec<CurrencyRate>,
    pub selected: String,
}

impl Default for CurrencyState {
    fn default() -> Self {
        Self {
            currencies: Vec::new(),
            selected: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl CurrencyState {
    pub fn rate_for(&self, code: &str) -> Option<Decimal> {
        self.currencies
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .map(|c| c.rate)
    }

    /// Rate of the selected currency.
    pub fn selected_rate(&self) -> Option<Decimal> {
        self.rate_for(&self.selected)
    }
}

/// Staking operators and the wallet's delegations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakingState {
    pub operators: Vec<Operator>,
}

/// Price alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// User preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsState {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub notification_permission: NotificationPermission,
    /// Hide tokens flagged unvetted in token listings.
    #[serde(default)]
    pub hide_unvetted: bool,
}

/// Notification history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationState {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl NotificationState {
    /// Prepend a notification, dropping the oldest beyond the cap.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
        self.notifications.truncate(MAX_NOTIFICATIONS);
    }
}

/// The whole application state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootState {
    pub blockchain: BlockchainState,
    pub account: AccountState,
    pub token: TokenState,
    pub currency: CurrencyState,
    pub staking: StakingState,
    pub alert: AlertState,
    pub settings: SettingsState,
    pub notification: NotificationState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ProviderKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mark_all_disconnected() {
        let addr = Address::native();
        let mut wallet = Wallet::new(addr, ProviderKind::ZilPay);
        wallet.is_connected = true;
        let mut account = AccountState {
            initialized: true,
            network: Network::Mainnet,
            wallets: vec![wallet.clone()],
            selected_wallet: Some(wallet),
        };

        account.mark_all_disconnected();
        assert!(account.wallets.iter().all(|w| !w.is_connected));
        assert!(!account.selected_wallet.unwrap().is_connected);
    }

    #[test]
    fn test_notification_history_cap() {
        let mut state = NotificationState::default();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            state.push(Notification::new(format!("n{i}"), ""));
        }
        assert_eq!(state.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(state.notifications[0].title, format!("n{}", MAX_NOTIFICATIONS + 4));
    }

    #[test]
    fn test_currency_lookup_case_insensitive() {
        let state = CurrencyState {
            currencies: vec![CurrencyRate::new("usd", dec!(0.05)), CurrencyRate::new("EUR", dec!(0.04))],
            selected: "eur".to_string(),
        };
        assert_eq!(state.rate_for("USD"), Some(dec!(0.05)));
        assert_eq!(state.selected_rate(), Some(dec!(0.04)));
    }

    #[test]
    fn test_account_default_is_mainnet_without_wallets() {
        let account = AccountState::default();
        assert_eq!(account.network, Network::Mainnet);
        assert!(account.wallets.is_empty());
        assert!(account.selected_address().is_none());
    }
}
