//! Dashboard state: a read-only view over the store.

use chrono::Utc;

use zilstream_core::{Notification, RootState};
use zilstream_store::{portfolio_view, StoreHandle};

use crate::types::{AlertSnapshot, DashboardSnapshot};

/// Notifications included in a snapshot.
const RECENT_NOTIFICATIONS: usize = 10;

#[derive(Clone)]
pub struct DashboardState {
    store: StoreHandle,
}

impl DashboardState {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Collect a snapshot under one read lock.
    pub fn collect_snapshot(&self) -> DashboardSnapshot {
        self.store.read(|state| DashboardSnapshot {
            timestamp_ms: Utc::now().timestamp_millis(),
            network: state.account.network,
            wallet_connected: state
                .account
                .selected_wallet
                .as_ref()
                .is_some_and(|w| w.is_connected),
            portfolio: portfolio_view(state),
            alerts: alert_snapshots(state),
            notifications: state
                .notification
                .notifications
                .iter()
                .take(RECENT_NOTIFICATIONS)
                .cloned()
                .collect(),
        })
    }

    /// Newest notification, if any.
    pub fn latest_notification(&self) -> Option<Notification> {
        self.store
            .read(|state| state.notification.notifications.first().cloned())
    }
}

fn alert_snapshots(state: &RootState) -> Vec<AlertSnapshot> {
    state
        .alert
        .alerts
        .iter()
        .map(|a| AlertSnapshot {
            id: a.id.to_string(),
            symbol: state.token.get(&a.token_address).map(|t| t.symbol.clone()),
            condition: a.to_string(),
            triggered: a.triggered,
            triggered_at: a.triggered_at,
        })
        .collect()
}
