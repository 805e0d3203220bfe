//! Store actions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use zilstream_core::{
    AccountState, Address, Alert, AlertState, CurrencyRate, Network, Notification,
    NotificationState, Operator, ProviderKind, RawAmount, SettingsState, TokenInfo,
    TokenPoolUpdate, TokenUpdate,
};

/// A discrete state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // --- blockchain ---
    BlockHeightUpdated(u64),

    // --- account ---
    /// Replace the account with a loaded copy.
    InitAccount(AccountState),
    /// A provider connected; upsert the wallet, select it, set the network.
    WalletConnected {
        address: Address,
        kind: ProviderKind,
        network: Network,
    },
    WalletUpdated {
        address: Address,
        is_connected: bool,
    },
    WalletSelected(Address),
    /// Forget the wallet.
    WalletDisconnected(Address),
    NetworkUpdated(Network),

    // --- tokens ---
    TokenInit(Vec<TokenInfo>),
    TokenUpdate(TokenUpdate),
    TokenAdd(TokenInfo),
    TokenBalanceUpdate {
        address: Address,
        balance: RawAmount,
    },
    TokenPoolUpdate {
        address: Address,
        update: TokenPoolUpdate,
    },
    TokenAprUpdate {
        address: Address,
        apr: Option<Decimal>,
    },
    FavoritesSet(Vec<Address>),
    FavoriteToggled(Address),

    // --- currency ---
    RatesUpdated(Vec<CurrencyRate>),
    CurrencySelected(String),

    // --- staking ---
    OperatorsLoaded(Vec<Operator>),
    DelegationUpdated {
        operator: Address,
        amount: RawAmount,
    },

    // --- alerts ---
    SetAlertState(AlertState),
    AlertAdded(Alert),
    AlertRemoved(Uuid),
    AlertTriggered {
        id: Uuid,
        at: DateTime<Utc>,
    },
    AlertReset(Uuid),

    // --- settings / notifications ---
    SettingsUpdated(SettingsState),
    SetNotificationState(NotificationState),
    NotificationPushed(Notification),
}

impl Action {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlockHeightUpdated(_) => "block_height_updated",
            Self::InitAccount(_) => "init_account",
            Self::WalletConnected { .. } => "wallet_connected",
            Self::WalletUpdated { .. } => "wallet_updated",
            Self::WalletSelected(_) => "wallet_selected",
            Self::WalletDisconnected(_) => "wallet_disconnected",
            Self::NetworkUpdated(_) => "network_updated",
            Self::TokenInit(_) => "token_init",
            Self::TokenUpdate(_) => "token_update",
            Self::TokenAdd(_) => "token_add",
            Self::TokenBalanceUpdate { .. } => "token_balance_update",
            Self::TokenPoolUpdate { .. } => "token_pool_update",
            Self::TokenAprUpdate { .. } => "token_apr_update",
            Self::FavoritesSet(_) => "favorites_set",
            Self::FavoriteToggled(_) => "favorite_toggled",
            Self::RatesUpdated(_) => "rates_updated",
            Self::CurrencySelected(_) => "currency_selected",
            Self::OperatorsLoaded(_) => "operators_loaded",
            Self::DelegationUpdated { .. } => "delegation_updated",
            Self::SetAlertState(_) => "set_alert_state",
            Self::AlertAdded(_) => "alert_added",
            Self::AlertRemoved(_) => "alert_removed",
            Self::AlertTriggered { .. } => "alert_triggered",
            Self::AlertReset(_) => "alert_reset",
            Self::SettingsUpdated(_) => "settings_updated",
            Self::SetNotificationState(_) => "set_notification_state",
            Self::NotificationPushed(_) => "notification_pushed",
        }
    }
}
