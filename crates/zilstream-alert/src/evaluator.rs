//! Alert evaluation.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;

use zilstream_core::{
    crypto_format, currency_format, Alert, Indicator, Metric, Notification, RootState, TokenInfo,
};
use zilstream_store::Action;
use zilstream_telemetry::Metrics;

use crate::notifier::Notifier;

/// An alert whose threshold was crossed.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredAlert {
    pub alert: Alert,
    pub current: Decimal,
    pub notification: Notification,
}

/// Current value of `metric` for a token. `zil_rate` is USD per ZIL.
pub fn current_value(metric: Metric, token: &TokenInfo, zil_rate: Decimal) -> Decimal {
    match metric {
        Metric::PriceZil => token.zil_rate(),
        Metric::Price => token.zil_rate().saturating_mul(zil_rate),
    }
}

/// Notification text for a token's current price.
pub fn alert_notification(token: &TokenInfo, zil_rate: Decimal) -> Notification {
    let rate = crypto_format(token.zil_rate());
    let usd = currency_format(token.zil_rate().saturating_mul(zil_rate));
    Notification::new(
        format!("{}: {} ZIL ({})", token.symbol, rate, usd),
        format!(
            "{}'s ({}) current price is {} ZIL ({}).",
            token.name, token.symbol, rate, usd
        ),
    )
    .for_token(token.address_bech32.clone())
}

pub struct AlertEvaluator {
    notifier: Arc<dyn Notifier>,
}

impl AlertEvaluator {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Alerts that fire against `state`.
    ///
    /// Nothing fires unless notifications are permitted. Already triggered
    /// alerts and alerts on unknown tokens are skipped.
    pub fn check(state: &RootState) -> Vec<FiredAlert> {
        if !state.settings.notification_permission.is_granted() {
            return Vec::new();
        }

        let zil_rate = state.token.zil_rate;
        state
            .alert
            .alerts
            .iter()
            .filter(|a| !a.triggered)
            .filter_map(|alert| {
                let Some(token) = state.token.get(&alert.token_address) else {
                    debug!(alert = %alert.id, token = %alert.token_address, "Alert on unknown token");
                    return None;
                };
                let current = current_value(alert.metric, token, zil_rate);
                alert.indicator.is_met(current, alert.value).then(|| FiredAlert {
                    alert: alert.clone(),
                    current,
                    notification: alert_notification(token, zil_rate),
                })
            })
            .collect()
    }

    /// Check alerts, notify, and return the actions recording what fired.
    pub fn evaluate(&self, state: &RootState) -> Vec<Action> {
        let fired = Self::check(state);
        let now = Utc::now();

        let mut actions = Vec::with_capacity(fired.len() * 2);
        for f in fired {
            debug!(alert = %f.alert, current = %f.current, "Alert fired");
            Metrics::alert_fired(metric_label(f.alert.metric), indicator_label(f.alert.indicator));
            self.notifier.notify(&f.notification);
            actions.push(Action::AlertTriggered {
                id: f.alert.id,
                at: now,
            });
            actions.push(Action::NotificationPushed(f.notification));
        }
        actions
    }
}

fn metric_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Price => "price",
        Metric::PriceZil => "price_zil",
    }
}

fn indicator_label(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Above => "above",
        Indicator::Below => "below",
    }
}
