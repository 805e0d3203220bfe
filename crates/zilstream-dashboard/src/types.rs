//! Dashboard API types.
//!
//! Serialized as JSON in the REST and WebSocket APIs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use zilstream_core::{Network, Notification};
use zilstream_store::PortfolioView;

/// Full dashboard snapshot (sent on connect and via REST).
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Unix milliseconds.
    pub timestamp_ms: i64,
    pub network: Network,
    /// Whether the selected wallet is connected.
    pub wallet_connected: bool,
    pub portfolio: PortfolioView,
    pub alerts: Vec<AlertSnapshot>,
    /// Most recent notifications, newest first.
    pub notifications: Vec<Notification>,
}

/// One configured price alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSnapshot {
    pub id: String,
    /// Token symbol, when the token is known.
    pub symbol: Option<String>,
    /// Human readable condition, e.g. "Price (ZIL) above 5".
    pub condition: String,
    pub triggered: bool,
    pub triggered_at: Option<DateTime<Utc>>,
}

/// WebSocket message types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMessage {
    /// Full snapshot (sent on connect).
    Snapshot(DashboardSnapshot),
    /// Periodic update.
    Update {
        timestamp_ms: i64,
        portfolio: PortfolioView,
        #[serde(skip_serializing_if = "Option::is_none")]
        alerts: Option<Vec<AlertSnapshot>>,
    },
    /// A notification was emitted since the last update.
    Notification {
        timestamp_ms: i64,
        title: String,
        body: String,
    },
}
