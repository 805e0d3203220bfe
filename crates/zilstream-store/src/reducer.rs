//! Reducer: applies one action to the root state.

use tracing::debug;

use zilstream_core::{RootState, TokenPool, Wallet};

use crate::action::Action;
use crate::changes::{Change, Changes};

/// Apply `action` to `state` and report what changed.
pub fn reduce(state: &mut RootState, action: Action) -> Changes {
    let mut changes = Changes::NONE;

    match action {
        Action::BlockHeightUpdated(height) => {
            let previous = state.blockchain.block_height;
            if previous.map_or(true, |p| height > p) {
                state.blockchain.block_height = Some(height);
                changes.insert(Change::Blockchain);
                changes.insert(Change::NewBlock);
            }
        }

        Action::InitAccount(account) => {
            let before = state.account.selected_address().cloned();
            state.account = account;
            state.account.initialized = true;
            changes.insert(Change::Account);
            if state.account.selected_address() != before.as_ref() {
                changes.insert(Change::WalletSelected);
            }
        }
        Action::WalletConnected {
            address,
            kind,
            network,
        } => {
            let before = state.account.selected_address().cloned();
            let account = &mut state.account;
            account.network = network;

            let wallet = match account.wallets.iter_mut().find(|w| w.address == address) {
                Some(w) => {
                    w.kind = kind;
                    w.is_connected = true;
                    w.clone()
                }
                None => {
                    let mut w = Wallet::new(address.clone(), kind);
                    w.is_connected = true;
                    account.wallets.push(w.clone());
                    w
                }
            };
            account.selected_wallet = Some(wallet);
            changes.insert(Change::Account);
            if before.as_ref() != Some(&address) {
                changes.insert(Change::WalletSelected);
            }
        }
        Action::WalletUpdated {
            address,
            is_connected,
        } => {
            let account = &mut state.account;
            if let Some(w) = account.wallets.iter_mut().find(|w| w.address == address) {
                w.is_connected = is_connected;
                changes.insert(Change::Account);
            }
            if let Some(w) = account.selected_wallet.as_mut().filter(|w| w.address == address) {
                w.is_connected = is_connected;
                changes.insert(Change::Account);
            }
        }
        Action::WalletSelected(address) => {
            let account = &mut state.account;
            let already = account.selected_address() == Some(&address);
            match account.wallets.iter().find(|w| w.address == address) {
                Some(w) if !already => {
                    account.selected_wallet = Some(w.clone());
                    changes.insert(Change::Account);
                    changes.insert(Change::WalletSelected);
                }
                Some(_) => {}
                None => debug!(%address, "Ignoring selection of unknown wallet"),
            }
        }
        Action::WalletDisconnected(address) => {
            let account = &mut state.account;
            let len = account.wallets.len();
            account.wallets.retain(|w| w.address != address);
            if account.wallets.len() != len {
                changes.insert(Change::Account);
            }
            if account.selected_address() == Some(&address) {
                account.selected_wallet = None;
                changes.insert(Change::Account);
                changes.insert(Change::WalletSelected);
                // Balances belong to the wallet that just left.
                for t in &mut state.token.tokens {
                    t.balance = None;
                    if let Some(pool) = &mut t.pool {
                        pool.user_contribution = None;
                        pool.contribution_percentage = None;
                    }
                }
                for op in &mut state.staking.operators {
                    op.delegated = None;
                }
                changes.insert(Change::Token);
                changes.insert(Change::Staking);
            }
        }
        Action::NetworkUpdated(network) => {
            if state.account.network != network {
                state.account.network = network;
                changes.insert(Change::Account);
            }
        }

        Action::TokenInit(tokens) => {
            let was_initialized = state.token.initialized;
            state.token.tokens = tokens;
            state.token.initialized = true;
            changes.insert(Change::Token);
            if !was_initialized {
                changes.insert(Change::TokensInitialized);
            }
        }
        Action::TokenUpdate(update) => {
            let Some(address) = update.address_bech32.clone() else {
                debug!("Ignoring token update without address");
                return changes;
            };
            match state.token.get_mut(&address) {
                Some(token) => {
                    token.apply(&update);
                    changes.insert(Change::Token);
                }
                None => debug!(%address, "Ignoring update for unknown token"),
            }
        }
        Action::TokenAdd(token) => {
            if state.token.get(&token.address_bech32).is_none() {
                state.token.tokens.push(token);
                changes.insert(Change::Token);
            }
        }
        Action::TokenBalanceUpdate { address, balance } => {
            if let Some(token) = state.token.get_mut(&address) {
                token.balance = Some(balance);
                changes.insert(Change::Token);
            }
        }
        Action::TokenPoolUpdate { address, update } => {
            if let Some(token) = state.token.get_mut(&address) {
                let decimals = token.decimals;
                token
                    .pool
                    .get_or_insert_with(TokenPool::default)
                    .apply(&update, decimals);
                changes.insert(Change::Token);
            }
        }
        Action::TokenAprUpdate { address, apr } => {
            if let Some(token) = state.token.get_mut(&address) {
                if token.apr != apr {
                    token.apr = apr;
                    changes.insert(Change::Token);
                }
            }
        }
        Action::FavoritesSet(addresses) => {
            for token in &mut state.token.tokens {
                token.is_favorited = addresses.contains(&token.address_bech32);
            }
            changes.insert(Change::Token);
        }
        Action::FavoriteToggled(address) => {
            if let Some(token) = state.token.get_mut(&address) {
                token.is_favorited = !token.is_favorited;
                changes.insert(Change::Token);
                changes.insert(Change::Favorites);
            }
        }

        Action::RatesUpdated(rates) => {
            for rate in rates {
                if rate.code == "USD" {
                    state.token.zil_rate = rate.rate;
                    changes.insert(Change::Token);
                }
                match state
                    .currency
                    .currencies
                    .iter_mut()
                    .find(|c| c.code == rate.code)
                {
                    Some(existing) => existing.rate = rate.rate,
                    None => state.currency.currencies.push(rate),
                }
                changes.insert(Change::Currency);
            }
        }
        Action::CurrencySelected(code) => {
            let code = code.to_uppercase();
            if state.currency.selected != code {
                state.currency.selected = code;
                changes.insert(Change::Currency);
                changes.insert(Change::CurrencySelected);
            }
        }

        Action::OperatorsLoaded(operators) => {
            state.staking.operators = operators;
            changes.insert(Change::Staking);
            changes.insert(Change::OperatorsLoaded);
        }
        Action::DelegationUpdated { operator, amount } => {
            if let Some(op) = state
                .staking
                .operators
                .iter_mut()
                .find(|o| o.address == operator)
            {
                op.delegated = Some(amount);
                changes.insert(Change::Staking);
            }
        }

        Action::SetAlertState(alerts) => {
            state.alert = alerts;
            state.alert.initialized = true;
            changes.insert(Change::Alert);
        }
        Action::AlertAdded(alert) => {
            state.alert.alerts.push(alert);
            changes.insert(Change::Alert);
        }
        Action::AlertRemoved(id) => {
            let len = state.alert.alerts.len();
            state.alert.alerts.retain(|a| a.id != id);
            if state.alert.alerts.len() != len {
                changes.insert(Change::Alert);
            }
        }
        Action::AlertTriggered { id, at } => {
            if let Some(alert) = state.alert.alerts.iter_mut().find(|a| a.id == id) {
                if !alert.triggered {
                    alert.triggered = true;
                    alert.triggered_at = Some(at);
                    changes.insert(Change::Alert);
                }
            }
        }
        Action::AlertReset(id) => {
            if let Some(alert) = state.alert.alerts.iter_mut().find(|a| a.id == id) {
                alert.triggered = false;
                alert.triggered_at = None;
                changes.insert(Change::Alert);
            }
        }

        Action::SettingsUpdated(settings) => {
            state.settings = settings;
            state.settings.initialized = true;
            changes.insert(Change::Settings);
        }
        Action::SetNotificationState(notifications) => {
            state.notification = notifications;
            state.notification.initialized = true;
            changes.insert(Change::Notification);
        }
        Action::NotificationPushed(notification) => {
            state.notification.push(notification);
            changes.insert(Change::Notification);
        }
    }

    changes
}
