//! Plain-text tables for the CLI.

use std::fmt::Write;

use rust_decimal::Decimal;
use zilstream_core::{crypto_format, currency_format, money_format, Alert, TokenState};
use zilstream_store::PortfolioView;

fn percent(value: Decimal) -> String {
    format!("{}%", money_format(value, 2))
}

/// Summary, balances, pools and staking of one portfolio.
pub fn portfolio_table(view: &PortfolioView) -> String {
    let s = &view.summary;
    let mut out = String::new();

    let wallet = s
        .wallet
        .as_ref()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "(no wallet)".to_string());
    let _ = writeln!(out, "Wallet:  {wallet}");
    if let Some(height) = s.block_height {
        let _ = writeln!(out, "Block:   {height}");
    }
    let _ = writeln!(out, "ZIL:     {}", currency_format(s.zil_rate));
    let _ = write!(
        out,
        "Total:   {} ZIL ({})",
        crypto_format(s.total_zil),
        currency_format(s.total_usd)
    );
    match s.total_fiat {
        Some(fiat) if s.currency != "USD" => {
            let _ = writeln!(out, " / {} {}", money_format(fiat, 2), s.currency);
        }
        _ => {
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<10} {:>24} {:>14} {:>16} {:>14} {:>8}",
        "TOKEN", "BALANCE", "RATE (ZIL)", "VALUE (ZIL)", "VALUE (USD)", "SHARE"
    );
    if view.balances.is_empty() {
        let _ = writeln!(out, "(no balances)");
    }
    for row in &view.balances {
        let _ = writeln!(
            out,
            "{:<10} {:>24} {:>14} {:>16} {:>14} {:>8}",
            row.symbol,
            row.balance.to_string(),
            crypto_format(row.rate),
            crypto_format(row.zil_value),
            currency_format(row.usd_value),
            percent(row.share),
        );
    }

    if !view.pools.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<10} {:>10} {:>16} {:>18} {:>14} {:>10}",
            "POOL", "SHARE", "ZIL", "TOKEN", "VALUE (USD)", "APR"
        );
        for pool in &view.pools {
            let apr = pool.apr.map(percent).unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:<10} {:>10} {:>16} {:>18} {:>14} {:>10}",
                pool.symbol,
                percent(pool.share),
                crypto_format(pool.zil_amount),
                crypto_format(pool.token_amount),
                currency_format(pool.usd_value),
                apr,
            );
        }
    }

    if !view.staking.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<24} {:>18} {:>14}", "OPERATOR", "STAKED (ZIL)", "VALUE (USD)");
        for position in &view.staking {
            let _ = writeln!(
                out,
                "{:<24} {:>18} {:>14}",
                position.name,
                crypto_format(position.amount),
                currency_format(position.usd_value),
            );
        }
    }

    out
}

/// One line per alert, with the token symbol when known.
pub fn alert_table(alerts: &[Alert], tokens: &TokenState) -> String {
    if alerts.is_empty() {
        return "(no alerts)\n".to_string();
    }
    let mut out = String::new();
    for alert in alerts {
        let token = tokens
            .get(&alert.token_address)
            .map(|t| t.symbol.clone())
            .unwrap_or_else(|| alert.token_address.to_string());
        let status = if alert.triggered { "triggered" } else { "armed" };
        let _ = writeln!(out, "{}  {:<10} {}  [{}]", alert.id, token, alert, status);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use zilstream_core::{Address, Indicator, Metric, RawAmount, RootState, TokenInfo};
    use zilstream_store::portfolio_view;

    fn address(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_portfolio_table_lists_held_tokens() {
        let mut state = RootState::default();
        state.token.zil_rate = dec!(0.05);
        let mut gzil = TokenInfo::new(address(1), "GZIL", "governance ZIL", 3, dec!(10));
        gzil.balance = Some(RawAmount::new(1000));
        let empty = TokenInfo::new(address(2), "XSGD", "XSGD", 6, dec!(30));
        state.token.tokens = vec![gzil, empty];

        let table = portfolio_table(&portfolio_view(&state));
        assert!(table.contains("(no wallet)"));
        assert!(table.contains("GZIL"));
        assert!(table.contains("1.000"));
        assert!(table.contains("$0.50"));
        assert!(!table.contains("XSGD"));
    }

    #[test]
    fn test_empty_portfolio() {
        let table = portfolio_table(&portfolio_view(&RootState::default()));
        assert!(table.contains("(no balances)"));
    }

    #[test]
    fn test_alert_table_uses_symbol() {
        let mut tokens = TokenState::default();
        tokens.tokens.push(TokenInfo::new(address(1), "GZIL", "governance ZIL", 15, dec!(6)));
        let alert = Alert::new(address(1), Metric::PriceZil, Indicator::Above, dec!(5));

        let table = alert_table(&[alert], &tokens);
        assert!(table.contains("GZIL"));
        assert!(table.contains("armed"));
        assert_eq!(alert_table(&[], &tokens), "(no alerts)\n");
    }
}
