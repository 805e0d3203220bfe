//! Portfolio derivations.
//!
//! Every value here is computed from a state snapshot on demand: raw
//! balances are compressed with the token decimals and multiplied by the
//! current rates. Nothing is written back into the store.

use rust_decimal::Decimal;
use serde::Serialize;

use zilstream_core::{Address, RootState, TokenInfo, TokenState, ZIL_DECIMALS};

/// Weeks per year used for APR annualization.
const WEEKS_PER_YEAR: u32 = 52;

// ============================================================================
// Token valuation
// ============================================================================

/// Value of one token holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TokenValuation {
    pub zil_value: Decimal,
    pub usd_value: Decimal,
}

/// Value a token holding in ZIL and USD.
///
/// The native token is worth its balance in ZIL; any other token is worth
/// balance × rate. USD is the ZIL value times `zil_rate` (USD per ZIL).
/// Products beyond the decimal range saturate.
pub fn value_token(token: &TokenInfo, zil_rate: Decimal) -> TokenValuation {
    let balance = token.compressed_balance().unwrap_or(Decimal::ZERO);
    let zil_value = balance.saturating_mul(token.zil_rate());
    TokenValuation {
        zil_value,
        usd_value: zil_value.saturating_mul(zil_rate),
    }
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `part` as a percentage of `total`, zero when undefined.
fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    part.checked_div(total)
        .and_then(|f| f.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// ZIL value of every token holding combined.
pub fn total_zil(tokens: &TokenState) -> Decimal {
    saturating_sum(
        tokens
            .tokens
            .iter()
            .map(|t| value_token(t, tokens.zil_rate).zil_value),
    )
}

/// One row of the balances table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceRow {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub icon: String,
    pub is_zil: bool,
    /// Balance in human units.
    pub balance: Decimal,
    /// Price in ZIL.
    pub rate: Decimal,
    pub zil_value: Decimal,
    pub usd_value: Decimal,
    /// Share of the total ZIL value, in percent.
    pub share: Decimal,
}

/// Tokens with a non-zero balance, most valuable first.
///
/// The sort is stable: tokens of equal USD value keep their list order.
pub fn balance_rows(tokens: &TokenState) -> Vec<BalanceRow> {
    let total = total_zil(tokens);

    let mut rows: Vec<BalanceRow> = tokens
        .tokens
        .iter()
        .filter(|t| t.has_balance())
        .map(|t| {
            let valuation = value_token(t, tokens.zil_rate);
            let share = percent_of(valuation.zil_value, total);
            BalanceRow {
                address: t.address_bech32.clone(),
                symbol: t.symbol.clone(),
                name: t.name.clone(),
                icon: t.icon.clone(),
                is_zil: t.is_zil,
                balance: t.compressed_balance().unwrap_or(Decimal::ZERO),
                rate: t.zil_rate(),
                zil_value: valuation.zil_value,
                usd_value: valuation.usd_value,
                share,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.usd_value.cmp(&a.usd_value));
    rows
}

// ============================================================================
// Liquidity pools
// ============================================================================

/// The wallet's share of one DEX pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolPosition {
    pub address: Address,
    pub symbol: String,
    /// Share of the pool, in percent.
    pub share: Decimal,
    pub zil_amount: Decimal,
    pub token_amount: Decimal,
    pub zil_value: Decimal,
    pub usd_value: Decimal,
    pub apr: Option<Decimal>,
}

/// Pools in which the wallet holds a non-zero contribution.
pub fn pool_positions(tokens: &TokenState) -> Vec<PoolPosition> {
    let mut positions: Vec<PoolPosition> = tokens
        .tokens
        .iter()
        .filter_map(|t| {
            let pool = t.pool.as_ref()?;
            pool.user_contribution.filter(|c| !c.is_zero())?;
            let share = pool.contribution_percentage?;

            let fraction = share / Decimal::ONE_HUNDRED;
            let zil_amount = pool
                .zil_reserve
                .compress_or_zero(ZIL_DECIMALS)
                .saturating_mul(fraction);
            let token_amount = pool
                .token_reserve
                .compress_or_zero(t.decimals)
                .saturating_mul(fraction);
            let zil_value = zil_amount.saturating_add(token_amount.saturating_mul(t.zil_rate()));

            Some(PoolPosition {
                address: t.address_bech32.clone(),
                symbol: t.symbol.clone(),
                share,
                zil_amount,
                token_amount,
                zil_value,
                usd_value: zil_value.saturating_mul(tokens.zil_rate),
                apr: t.apr,
            })
        })
        .collect();

    positions.sort_by(|a, b| b.usd_value.cmp(&a.usd_value));
    positions
}

/// Annual reward rate of a token's pool, in percent.
///
/// Weekly rewards are valued in ZIL at the reward token's current rate and
/// annualized against the pool liquidity (twice its ZIL reserve). `None`
/// when the token has no pool, no rewards, an empty pool, or a result
/// outside the decimal range.
pub fn token_apr(token: &TokenInfo, tokens: &TokenState) -> Option<Decimal> {
    let pool = token.pool.as_ref()?;
    if token.rewards.is_empty() {
        return None;
    }

    let liquidity = pool
        .zil_reserve
        .compress(ZIL_DECIMALS)
        .ok()?
        .checked_mul(Decimal::TWO)?;
    if liquidity.is_zero() {
        return None;
    }

    let weekly_reward_zil = token.rewards.iter().try_fold(Decimal::ZERO, |acc, r| {
        let rate = tokens
            .get(&r.reward_token_address)
            .map(TokenInfo::zil_rate)
            .unwrap_or(Decimal::ZERO);
        let reward = r
            .amount
            .checked_mul(Decimal::from(r.epochs_per_week))?
            .checked_mul(rate)?;
        acc.checked_add(reward)
    })?;

    weekly_reward_zil
        .checked_mul(Decimal::from(WEEKS_PER_YEAR))?
        .checked_div(liquidity)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

// ============================================================================
// Staking
// ============================================================================

/// ZIL delegated to one staking operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakingPosition {
    pub operator: Address,
    pub name: String,
    pub amount: Decimal,
    pub usd_value: Decimal,
}

pub fn staking_positions(state: &RootState) -> Vec<StakingPosition> {
    let zil_rate = state.token.zil_rate;
    state
        .staking
        .operators
        .iter()
        .filter_map(|op| {
            let amount = op
                .delegated
                .filter(|d| !d.is_zero())?
                .compress_or_zero(ZIL_DECIMALS);
            Some(StakingPosition {
                operator: op.address.clone(),
                name: op.name.clone(),
                amount,
                usd_value: amount.saturating_mul(zil_rate),
            })
        })
        .collect()
}

// ============================================================================
// Summary
// ============================================================================

/// Portfolio totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub wallet: Option<Address>,
    pub block_height: Option<u64>,
    /// USD per ZIL.
    pub zil_rate: Decimal,
    pub holdings_zil: Decimal,
    pub liquidity_zil: Decimal,
    pub staked_zil: Decimal,
    pub total_zil: Decimal,
    pub total_usd: Decimal,
    /// Selected display currency.
    pub currency: String,
    /// Total in the selected currency, when its rate is known.
    pub total_fiat: Option<Decimal>,
    pub token_count: usize,
}

pub fn summarize(
    state: &RootState,
    balances: &[BalanceRow],
    pools: &[PoolPosition],
    staking: &[StakingPosition],
) -> PortfolioSummary {
    let holdings_zil = saturating_sum(balances.iter().map(|r| r.zil_value));
    let liquidity_zil = saturating_sum(pools.iter().map(|p| p.zil_value));
    let staked_zil = saturating_sum(staking.iter().map(|s| s.amount));
    let total_zil = saturating_sum([holdings_zil, liquidity_zil, staked_zil].into_iter());

    let currency = state.currency.selected.clone();
    let total_fiat = state
        .currency
        .rate_for(&currency)
        .map(|r| total_zil.saturating_mul(r));

    PortfolioSummary {
        wallet: state.account.selected_address().cloned(),
        block_height: state.blockchain.block_height,
        zil_rate: state.token.zil_rate,
        holdings_zil,
        liquidity_zil,
        staked_zil,
        total_zil,
        total_usd: total_zil.saturating_mul(state.token.zil_rate),
        currency,
        total_fiat,
        token_count: state.token.tokens.len(),
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioView {
    pub summary: PortfolioSummary,
    pub balances: Vec<BalanceRow>,
    pub pools: Vec<PoolPosition>,
    pub staking: Vec<StakingPosition>,
}

pub fn portfolio_view(state: &RootState) -> PortfolioView {
    let balances = balance_rows(&state.token);
    let pools = pool_positions(&state.token);
    let staking = staking_positions(state);
    let summary = summarize(state, &balances, &pools, &staking);
    PortfolioView {
        summary,
        balances,
        pools,
        staking,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use zilstream_core::{
        CurrencyRate, Operator, RawAmount, TokenPool, TokenPoolUpdate, TokenReward,
    };

    fn address(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from_bytes(&bytes).unwrap()
    }

    fn native(balance: u128) -> TokenInfo {
        let mut t = TokenInfo::new(Address::native(), "ZIL", "Zilliqa", 12, Decimal::ONE);
        t.is_zil = true;
        t.balance = Some(RawAmount::new(balance));
        t
    }

    fn token(last: u8, symbol: &str, decimals: u32, rate: Decimal, balance: Option<u128>) -> TokenInfo {
        let mut t = TokenInfo::new(address(last), symbol, symbol, decimals, rate);
        t.balance = balance.map(RawAmount::new);
        t
    }

    fn state_with(tokens: Vec<TokenInfo>, zil_rate: Decimal) -> TokenState {
        TokenState {
            initialized: true,
            zil_rate,
            tokens,
        }
    }

    #[test]
    fn test_value_token_uses_rate_and_zil_rate() {
        // 2 tokens at rate 10 ZIL, 0.05 USD per ZIL
        let t = token(1, "A", 3, dec!(10), Some(2_000));
        let v = value_token(&t, dec!(0.05));
        assert_eq!(v.zil_value, dec!(20));
        assert_eq!(v.usd_value, dec!(2) * dec!(10) * dec!(0.05));
    }

    #[test]
    fn test_native_token_valued_at_balance() {
        let v = value_token(&native(3_000_000_000_000), dec!(0.02));
        assert_eq!(v.zil_value, dec!(3));
        assert_eq!(v.usd_value, dec!(0.06));
    }

    #[test]
    fn test_compressed_balance_display() {
        let t = token(1, "A", 3, dec!(1), Some(1000));
        let rows = balance_rows(&state_with(vec![t], dec!(1)));
        assert_eq!(rows[0].balance.to_string(), "1.000");
    }

    #[test]
    fn test_zero_and_missing_balances_excluded() {
        let tokens = state_with(
            vec![
                token(1, "ZERO", 12, dec!(1), Some(0)),
                token(2, "NONE", 12, dec!(1), None),
                token(3, "SOME", 12, dec!(1), Some(1)),
            ],
            dec!(0.05),
        );
        let rows = balance_rows(&tokens);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "SOME");
    }

    #[test]
    fn test_rows_sorted_descending_and_stable() {
        let tokens = state_with(
            vec![
                token(1, "LOW", 0, dec!(1), Some(1)),
                token(2, "TIE1", 0, dec!(1), Some(5)),
                token(3, "HIGH", 0, dec!(1), Some(9)),
                token(4, "TIE2", 0, dec!(5), Some(1)),
            ],
            dec!(1),
        );
        let symbols: Vec<_> = balance_rows(&tokens)
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        assert_eq!(symbols, vec!["HIGH", "TIE1", "TIE2", "LOW"]);
    }

    #[test]
    fn test_share_against_total() {
        let tokens = state_with(
            vec![native(3_000_000_000_000), token(1, "A", 0, dec!(1), Some(1))],
            dec!(1),
        );
        let rows = balance_rows(&tokens);
        assert_eq!(rows[0].share, dec!(75));
        assert_eq!(rows[1].share, dec!(25));
        assert_eq!(total_zil(&tokens), dec!(4));
    }

    #[test]
    fn test_wide_balance_valued_not_zeroed() {
        // 1e29 raw at 18 decimals is 100 billion tokens
        let t = token(1, "BIG", 18, dec!(2), Some(100_000_000_000_000_000_000_000_000_000));
        let rows = balance_rows(&state_with(vec![t], dec!(0.05)));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].balance, dec!(100000000000));
        assert_eq!(rows[0].zil_value, dec!(200000000000));
        assert_eq!(rows[0].usd_value, dec!(10000000000));
        assert_eq!(rows[0].share, dec!(100));
    }

    #[test]
    fn test_out_of_range_values_saturate() {
        // Near Decimal::MAX in human units, then multiplied by rates
        let huge = token(1, "HUGE", 0, dec!(10), Some(70_000_000_000_000_000_000_000_000_000));
        let v = value_token(&huge, dec!(0.05));
        assert_eq!(v.zil_value, Decimal::MAX);
        assert!(v.usd_value > Decimal::ZERO && v.usd_value < Decimal::MAX);

        let mut state = RootState::default();
        let huge2 = token(2, "HUGE2", 0, dec!(10), Some(70_000_000_000_000_000_000_000_000_000));
        state.token = state_with(vec![huge, huge2], dec!(1000));
        state.currency.currencies = vec![CurrencyRate::new("EUR", dec!(900))];
        state.currency.selected = "EUR".to_string();

        let view = portfolio_view(&state);
        assert_eq!(view.balances.len(), 2);
        assert_eq!(view.summary.total_zil, Decimal::MAX);
        assert_eq!(view.summary.total_usd, Decimal::MAX);
        assert_eq!(view.summary.total_fiat, Some(Decimal::MAX));
        assert_eq!(view.balances[0].share, dec!(100));
    }

    #[test]
    fn test_apr_out_of_range_is_none() {
        let gov = token(9, "GOV", 15, Decimal::MAX, None);
        let mut pooled = pooled_token();
        pooled.rewards = vec![TokenReward {
            reward_token_address: address(9),
            amount: dec!(10),
            epochs_per_week: 7,
        }];
        let tokens = state_with(vec![pooled.clone(), gov], dec!(1));
        assert_eq!(token_apr(&pooled, &tokens), None);
    }

    fn pooled_token() -> TokenInfo {
        let mut t = token(1, "A", 3, dec!(100), None);
        let mut pool = TokenPool::default();
        pool.apply(
            &TokenPoolUpdate {
                // 1000 ZIL against 10 tokens
                zil_reserve: Some(RawAmount::new(1_000_000_000_000_000)),
                token_reserve: Some(RawAmount::new(10_000)),
                total_contribution: Some(RawAmount::new(400)),
                user_contribution: Some(RawAmount::new(100)),
            },
            3,
        );
        t.pool = Some(pool);
        t
    }

    #[test]
    fn test_pool_position_share_of_reserves() {
        let tokens = state_with(vec![pooled_token()], dec!(0.1));
        let positions = pool_positions(&tokens);
        assert_eq!(positions.len(), 1);
        let p = &positions[0];
        assert_eq!(p.share, dec!(25));
        assert_eq!(p.zil_amount, dec!(250));
        assert_eq!(p.token_amount, dec!(2.5));
        assert_eq!(p.zil_value, dec!(500));
        assert_eq!(p.usd_value, dec!(50));
    }

    #[test]
    fn test_apr() {
        let gov = token(9, "GOV", 15, dec!(2), None);
        let mut pooled = pooled_token();
        pooled.rewards = vec![TokenReward {
            reward_token_address: address(9),
            amount: dec!(10),
            epochs_per_week: 1,
        }];
        let tokens = state_with(vec![pooled.clone(), gov], dec!(1));

        // 10 GOV × 2 ZIL × 52 / 2000 ZIL × 100
        assert_eq!(token_apr(&pooled, &tokens), Some(dec!(52)));
    }

    #[test]
    fn test_apr_none_without_pool_rewards_or_liquidity() {
        let tokens = state_with(Vec::new(), dec!(1));
        let plain = token(1, "A", 3, dec!(1), None);
        assert_eq!(token_apr(&plain, &tokens), None);

        let pooled = pooled_token();
        assert_eq!(token_apr(&pooled, &tokens), None);

        let mut empty = token(2, "B", 3, dec!(1), None);
        empty.pool = Some(TokenPool::default());
        empty.rewards = vec![TokenReward {
            reward_token_address: address(2),
            amount: dec!(1),
            epochs_per_week: 1,
        }];
        assert_eq!(token_apr(&empty, &tokens), None);
    }

    #[test]
    fn test_portfolio_view_totals() {
        let mut state = RootState::default();
        state.token = state_with(vec![native(10_000_000_000_000), pooled_token()], dec!(0.05));
        state.currency.currencies = vec![
            CurrencyRate::new("USD", dec!(0.05)),
            CurrencyRate::new("EUR", dec!(0.04)),
        ];
        state.currency.selected = "EUR".to_string();
        let mut op = Operator::new(address(7), "Moonlet");
        op.delegated = Some(RawAmount::new(90_000_000_000_000));
        state.staking.operators = vec![op, Operator::new(address(8), "Idle")];

        let view = portfolio_view(&state);
        assert_eq!(view.balances.len(), 1);
        assert_eq!(view.pools.len(), 1);
        assert_eq!(view.staking.len(), 1);
        assert_eq!(view.summary.holdings_zil, dec!(10));
        assert_eq!(view.summary.liquidity_zil, dec!(500));
        assert_eq!(view.summary.staked_zil, dec!(90));
        assert_eq!(view.summary.total_zil, dec!(600));
        assert_eq!(view.summary.total_usd, dec!(30));
        assert_eq!(view.summary.total_fiat, Some(dec!(24)));
    }
}
