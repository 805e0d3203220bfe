//! Prometheus metrics.
//!
//! # Panics
//!
//! Registration uses `unwrap()`: a failure means duplicate metric names,
//! which is a programming error surfaced on first access.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_int_gauge, CounterVec,
    Encoder, Gauge, GaugeVec, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Poll outcomes per data source.
/// Labels: source (tokens/rates/balances/block/staking), outcome (ok/error)
pub static POLL_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zilstream_poll_total",
        "Data poll outcomes per source",
        &["source", "outcome"]
    )
    .unwrap()
});

/// Alerts fired.
pub static ALERTS_FIRED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zilstream_alerts_fired_total",
        "Price alerts fired",
        &["metric", "indicator"]
    )
    .unwrap()
});

/// Tokens currently tracked.
pub static TOKENS_TRACKED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("zilstream_tokens_tracked", "Tokens currently tracked").unwrap()
});

/// Latest block height seen.
pub static BLOCK_HEIGHT: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("zilstream_block_height", "Latest transaction block height").unwrap()
});

/// USD per ZIL.
pub static ZIL_USD_RATE: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("zilstream_zil_usd_rate", "USD per ZIL").unwrap());

/// Portfolio value.
/// Labels: unit (zil/usd)
pub static PORTFOLIO_VALUE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "zilstream_portfolio_value",
        "Portfolio value of the selected wallet",
        &["unit"]
    )
    .unwrap()
});

/// Wallet connection state (1 = connected).
pub static WALLET_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "zilstream_wallet_connected",
        "Selected wallet connection state (1=connected)"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn poll_ok(source: &str) {
        POLL_TOTAL.with_label_values(&[source, "ok"]).inc();
    }

    pub fn poll_failed(source: &str) {
        POLL_TOTAL.with_label_values(&[source, "error"]).inc();
    }

    pub fn alert_fired(metric: &str, indicator: &str) {
        ALERTS_FIRED_TOTAL
            .with_label_values(&[metric, indicator])
            .inc();
    }

    pub fn tokens_tracked(count: usize) {
        TOKENS_TRACKED.set(count as i64);
    }

    pub fn block_height(height: u64) {
        BLOCK_HEIGHT.set(height as i64);
    }

    pub fn zil_rate(usd: f64) {
        ZIL_USD_RATE.set(usd);
    }

    /// Set portfolio totals.
    pub fn portfolio_value(zil: f64, usd: f64) {
        PORTFOLIO_VALUE.with_label_values(&["zil"]).set(zil);
        PORTFOLIO_VALUE.with_label_values(&["usd"]).set(usd);
    }

    pub fn wallet_connected(connected: bool) {
        WALLET_CONNECTED.set(if connected { 1.0 } else { 0.0 });
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn encode_metrics() -> TelemetryResult<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_metrics_include_poll_counter() {
        Metrics::poll_ok("tokens");
        Metrics::poll_failed("rates");
        Metrics::wallet_connected(true);

        let text = encode_metrics().unwrap();
        assert!(text.contains("zilstream_poll_total"));
        assert!(text.contains("source=\"tokens\""));
        assert!(text.contains("zilstream_wallet_connected 1"));
    }
}
