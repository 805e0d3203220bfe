//! Token metadata, rates and liquidity pool snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::RawAmount;

/// Reward distributed to liquidity providers of a token's pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenReward {
    /// Token paid out as reward.
    pub reward_token_address: Address,
    /// Human-unit amount distributed per epoch.
    pub amount: Decimal,
    /// Epochs per week.
    #[serde(default = "default_epochs_per_week")]
    pub epochs_per_week: u32,
}

fn default_epochs_per_week() -> u32 {
    1
}

/// Snapshot of a token's ZIL/token DEX pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPool {
    pub zil_reserve: RawAmount,
    pub token_reserve: RawAmount,
    /// ZIL per token implied by the reserves.
    pub exchange_rate: Decimal,
    pub total_contribution: RawAmount,
    #[serde(default)]
    pub user_contribution: Option<RawAmount>,
    /// Share of the pool owned by the connected wallet, in percent.
    #[serde(default)]
    pub contribution_percentage: Option<Decimal>,
}

/// Partial pool update, merged field by field into `TokenPool`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenPoolUpdate {
    pub zil_reserve: Option<RawAmount>,
    pub token_reserve: Option<RawAmount>,
    pub total_contribution: Option<RawAmount>,
    pub user_contribution: Option<RawAmount>,
}

impl TokenPoolUpdate {
    pub fn is_empty(&self) -> bool {
        self.zil_reserve.is_none()
            && self.token_reserve.is_none()
            && self.total_contribution.is_none()
            && self.user_contribution.is_none()
    }
}

impl TokenPool {
    /// Merge an update and recompute the rate and contribution share.
    pub fn apply(&mut self, update: &TokenPoolUpdate, token_decimals: u32) {
        if let Some(v) = update.zil_reserve {
            self.zil_reserve = v;
        }
        if let Some(v) = update.token_reserve {
            self.token_reserve = v;
        }
        if let Some(v) = update.total_contribution {
            self.total_contribution = v;
        }
        if let Some(v) = update.user_contribution {
            self.user_contribution = Some(v);
        }

        let zil = self.zil_reserve.compress_or_zero(crate::ZIL_DECIMALS);
        let tokens = self.token_reserve.compress_or_zero(token_decimals);
        // Out-of-range quotients read as no rate
        self.exchange_rate = zil.checked_div(tokens).unwrap_or(Decimal::ZERO);

        self.contribution_percentage = match self.user_contribution {
            Some(user) if !self.total_contribution.is_zero() => {
                match (user.compress(0), self.total_contribution.compress(0)) {
                    (Ok(user), Ok(total)) => user
                        .checked_div(total)
                        .and_then(|f| f.checked_mul(Decimal::ONE_HUNDRED)),
                    _ => None,
                }
            }
            Some(_) => Some(Decimal::ZERO),
            None => None,
        };
    }
}

/// Token as tracked by the store.
///
/// Metadata fields mirror the token API payload; `is_zil`, `is_favorited`,
/// `balance`, `pool` and `apr` are filled in locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub icon: String,
    pub address_bech32: Address,
    pub decimals: u32,
    #[serde(default)]
    pub init_supply: Decimal,
    #[serde(default)]
    pub max_supply: Decimal,
    #[serde(default)]
    pub total_supply: Decimal,
    #[serde(default)]
    pub current_supply: Decimal,
    #[serde(default)]
    pub daily_volume: Decimal,
    #[serde(default)]
    pub current_liquidity: Decimal,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub whitepaper: String,
    #[serde(default)]
    pub viewblock_score: i64,
    #[serde(default)]
    pub unvetted: bool,
    /// Price in ZIL.
    #[serde(default)]
    pub rate: Decimal,
    #[serde(default)]
    pub rewards: Vec<TokenReward>,

    #[serde(default)]
    pub is_zil: bool,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub balance: Option<RawAmount>,
    #[serde(default)]
    pub pool: Option<TokenPool>,
    #[serde(default)]
    pub apr: Option<Decimal>,
}

impl TokenInfo {
    /// Minimal token, mostly useful for tests and fixtures.
    pub fn new(
        address: Address,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u32,
        rate: Decimal,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            symbol: symbol.into(),
            icon: String::new(),
            address_bech32: address,
            decimals,
            init_supply: Decimal::ZERO,
            max_supply: Decimal::ZERO,
            total_supply: Decimal::ZERO,
            current_supply: Decimal::ZERO,
            daily_volume: Decimal::ZERO,
            current_liquidity: Decimal::ZERO,
            website: String::new(),
            whitepaper: String::new(),
            viewblock_score: 0,
            unvetted: false,
            rate,
            rewards: Vec::new(),
            is_zil: false,
            is_favorited: false,
            balance: None,
            pool: None,
            apr: None,
        }
    }

    /// Balance in human units, `None` when unknown or beyond precision.
    pub fn compressed_balance(&self) -> Option<Decimal> {
        self.balance.and_then(|b| b.compress(self.decimals).ok())
    }

    /// Whether the token holds a balance that shows as non-zero.
    pub fn has_balance(&self) -> bool {
        self.compressed_balance().is_some_and(|b| !b.is_zero())
    }

    /// Price in ZIL. The native token is always worth one ZIL.
    pub fn zil_rate(&self) -> Decimal {
        if self.is_zil {
            Decimal::ONE
        } else {
            self.rate
        }
    }

    /// Apply a metadata update, leaving local fields untouched.
    pub fn apply(&mut self, update: &TokenUpdate) {
        if let Some(v) = &update.id {
            self.id = v.clone();
        }
        if let Some(v) = &update.name {
            self.name = v.clone();
        }
        if let Some(v) = &update.symbol {
            self.symbol = v.clone();
        }
        if let Some(v) = &update.icon {
            self.icon = v.clone();
        }
        if let Some(v) = update.decimals {
            self.decimals = v;
        }
        if let Some(v) = update.init_supply {
            self.init_supply = v;
        }
        if let Some(v) = update.max_supply {
            self.max_supply = v;
        }
        if let Some(v) = update.total_supply {
            self.total_supply = v;
        }
        if let Some(v) = update.current_supply {
            self.current_supply = v;
        }
        if let Some(v) = update.daily_volume {
            self.daily_volume = v;
        }
        if let Some(v) = update.current_liquidity {
            self.current_liquidity = v;
        }
        if let Some(v) = &update.website {
            self.website = v.clone();
        }
        if let Some(v) = &update.whitepaper {
            self.whitepaper = v.clone();
        }
        if let Some(v) = update.viewblock_score {
            self.viewblock_score = v;
        }
        if let Some(v) = update.unvetted {
            self.unvetted = v;
        }
        if let Some(v) = update.rate {
            self.rate = v;
        }
        if let Some(v) = &update.rewards {
            self.rewards = v.clone();
        }
        if let Some(v) = update.is_favorited {
            self.is_favorited = v;
        }
    }
}

/// Partial token update keyed by address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenUpdate {
    pub address_bech32: Option<Address>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub icon: Option<String>,
    pub decimals: Option<u32>,
    pub init_supply: Option<Decimal>,
    pub max_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub current_supply: Option<Decimal>,
    pub daily_volume: Option<Decimal>,
    pub current_liquidity: Option<Decimal>,
    pub website: Option<String>,
    pub whitepaper: Option<String>,
    pub viewblock_score: Option<i64>,
    pub unvetted: Option<bool>,
    pub rate: Option<Decimal>,
    pub rewards: Option<Vec<TokenReward>>,
    pub is_favorited: Option<bool>,
}

impl From<&TokenInfo> for TokenUpdate {
    /// Metadata-only update built from a freshly fetched token.
    fn from(t: &TokenInfo) -> Self {
        Self {
            address_bech32: Some(t.address_bech32.clone()),
            id: Some(t.id.clone()),
            name: Some(t.name.clone()),
            symbol: Some(t.symbol.clone()),
            icon: Some(t.icon.clone()),
            decimals: Some(t.decimals),
            init_supply: Some(t.init_supply),
            max_supply: Some(t.max_supply),
            total_supply: Some(t.total_supply),
            current_supply: Some(t.current_supply),
            daily_volume: Some(t.daily_volume),
            current_liquidity: Some(t.current_liquidity),
            website: Some(t.website.clone()),
            whitepaper: Some(t.whitepaper.clone()),
            viewblock_score: Some(t.viewblock_score),
            unvetted: Some(t.unvetted),
            rate: Some(t.rate),
            rewards: Some(t.rewards.clone()),
            is_favorited: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn token() -> TokenInfo {
        let addr = Address::from_hex("0x00000000000000000000000000000000000000aa").unwrap();
        TokenInfo::new(addr, "GZIL", "governance ZIL", 15, dec!(300))
    }

    #[test]
    fn test_deserialize_api_payload() {
        let addr = Address::from_hex("0x00000000000000000000000000000000000000aa").unwrap();
        let json = format!(
            r#"{{
                "id": "42",
                "name": "governance ZIL",
                "symbol": "GZIL",
                "icon": "https://example.com/gzil.svg",
                "address_bech32": "{addr}",
                "decimals": 15,
                "init_supply": 0,
                "max_supply": 722700,
                "rate": 312.5,
                "unvetted": false
            }}"#
        );
        let t: TokenInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(t.symbol, "GZIL");
        assert_eq!(t.rate, dec!(312.5));
        assert_eq!(t.balance, None);
        assert!(t.rewards.is_empty());
        assert!(!t.is_zil);
    }

    #[test]
    fn test_apply_update_keeps_local_fields() {
        let mut t = token();
        t.balance = Some(RawAmount::new(5));
        t.is_favorited = true;

        let mut fresh = token();
        fresh.rate = dec!(350);
        t.apply(&TokenUpdate::from(&fresh));

        assert_eq!(t.rate, dec!(350));
        assert_eq!(t.balance, Some(RawAmount::new(5)));
        assert!(t.is_favorited);
    }

    #[test]
    fn test_zil_rate_for_native() {
        let mut t = token();
        assert_eq!(t.zil_rate(), dec!(300));
        t.is_zil = true;
        assert_eq!(t.zil_rate(), Decimal::ONE);
    }

    #[test]
    fn test_pool_apply_recomputes_rate_and_share() {
        let mut pool = TokenPool::default();
        pool.apply(
            &TokenPoolUpdate {
                // 1000 ZIL
                zil_reserve: Some(RawAmount::new(1_000_000_000_000_000)),
                // 10 tokens at 3 decimals
                token_reserve: Some(RawAmount::new(10_000)),
                total_contribution: Some(RawAmount::new(400)),
                user_contribution: Some(RawAmount::new(100)),
            },
            3,
        );
        assert_eq!(pool.exchange_rate, dec!(100));
        assert_eq!(pool.contribution_percentage, Some(dec!(25)));
    }

    #[test]
    fn test_has_balance_follows_compressed_value() {
        let mut t = token();
        assert!(!t.has_balance());

        t.balance = Some(RawAmount::ZERO);
        assert!(!t.has_balance());

        // 1e29 raw at 18 decimals
        t.decimals = 18;
        t.balance = Some(RawAmount::new(100_000_000_000_000_000_000_000_000_000));
        assert!(t.has_balance());
        assert_eq!(t.compressed_balance(), Some(dec!(100000000000)));

        // Integer part beyond decimal range: not listed rather than shown as zero
        t.decimals = 0;
        assert!(!t.has_balance());
        assert_eq!(t.compressed_balance(), None);
    }

    #[test]
    fn test_pool_extreme_reserves_do_not_panic() {
        let mut pool = TokenPool::default();
        pool.apply(
            &TokenPoolUpdate {
                zil_reserve: Some(RawAmount::new(u128::MAX)),
                // Smallest representable token reserve
                token_reserve: Some(RawAmount::new(1)),
                total_contribution: Some(RawAmount::new(1)),
                user_contribution: Some(RawAmount::new(70_000_000_000_000_000_000_000_000_000)),
            },
            28,
        );
        assert_eq!(pool.exchange_rate, Decimal::ZERO);
        assert_eq!(pool.contribution_percentage, None);
    }

    #[test]
    fn test_pool_without_reserves() {
        let mut pool = TokenPool::default();
        pool.apply(&TokenPoolUpdate::default(), 12);
        assert_eq!(pool.exchange_rate, Decimal::ZERO);
        assert_eq!(pool.contribution_percentage, None);
    }
}
