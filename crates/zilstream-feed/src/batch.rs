//! Portfolio balance batch.
//!
//! One JSON-RPC batch covers the native balance, every token balance, the
//! DEX pool reserves and contributions and the staking delegations of a
//! wallet. Each query gets the id `index + 1`; responses are matched back by
//! id and a missing or failed entry counts as a zero amount.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};
use tracing::debug;

use zilstream_core::{Address, RawAmount, TokenInfo, TokenPoolUpdate};
use zilstream_store::Action;

use crate::chain::{RpcRequest, RpcResponse};

/// One query of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceQuery {
    /// `GetBalance` of the wallet, credited to the native token address.
    NativeBalance(Address),
    /// Wallet entry in a token contract's `balances` map.
    TokenBalance(Address),
    /// DEX `pools` map (reserves of every pool).
    Pools,
    /// DEX `total_contributions` map.
    TotalContributions,
    /// Wallet entry in the DEX `balances` map of one pool.
    PoolContribution(Address),
    /// Wallet delegation to one staking operator.
    Delegation(Address),
}

/// Builder and result processor for one wallet's batch.
#[derive(Debug, Clone)]
pub struct PortfolioBatch {
    wallet: Address,
    dex: Address,
    staking: Address,
    queries: Vec<BalanceQuery>,
}

impl PortfolioBatch {
    pub fn new(wallet: Address, dex: Address, staking: Address) -> Self {
        Self {
            wallet,
            dex,
            staking,
            queries: Vec::new(),
        }
    }

    pub fn queries(&self) -> &[BalanceQuery] {
        &self.queries
    }

    pub fn native_balance(mut self, native_token: &Address) -> Self {
        self.queries.push(BalanceQuery::NativeBalance(native_token.clone()));
        self
    }

    /// Balances of every non-native token.
    pub fn token_balances(mut self, tokens: &[TokenInfo]) -> Self {
        self.queries.extend(
            tokens
                .iter()
                .filter(|t| !t.is_zil)
                .map(|t| BalanceQuery::TokenBalance(t.address_bech32.clone())),
        );
        self
    }

    /// Pool reserves, total contributions and the wallet's contribution to
    /// every non-native token's pool.
    pub fn pools(mut self, tokens: &[TokenInfo]) -> Self {
        self.queries.push(BalanceQuery::Pools);
        self.queries.push(BalanceQuery::TotalContributions);
        self.queries.extend(
            tokens
                .iter()
                .filter(|t| !t.is_zil)
                .map(|t| BalanceQuery::PoolContribution(t.address_bech32.clone())),
        );
        self
    }

    pub fn delegations<'a>(mut self, operators: impl IntoIterator<Item = &'a Address>) -> Self {
        self.queries
            .extend(operators.into_iter().cloned().map(BalanceQuery::Delegation));
        self
    }

    /// JSON-RPC requests, in query order.
    pub fn requests(&self) -> Vec<RpcRequest> {
        let wallet_key = self.wallet.to_prefixed_hex();
        self.queries
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let id = i as u64 + 1;
                match q {
                    BalanceQuery::NativeBalance(_) => {
                        RpcRequest::new(id, "GetBalance", json!([self.wallet.to_hex()]))
                    }
                    BalanceQuery::TokenBalance(token) => substate(
                        id,
                        token,
                        "balances",
                        json!([wallet_key]),
                    ),
                    BalanceQuery::Pools => substate(id, &self.dex, "pools", json!([])),
                    BalanceQuery::TotalContributions => {
                        substate(id, &self.dex, "total_contributions", json!([]))
                    }
                    BalanceQuery::PoolContribution(token) => substate(
                        id,
                        &self.dex,
                        "balances",
                        json!([token.to_prefixed_hex(), wallet_key]),
                    ),
                    BalanceQuery::Delegation(operator) => substate(
                        id,
                        &self.staking,
                        "deposit_amt_deleg",
                        json!([wallet_key, operator.to_prefixed_hex()]),
                    ),
                }
            })
            .collect()
    }

    /// Turn batch responses into store actions.
    pub fn process(&self, responses: Vec<RpcResponse>) -> Vec<Action> {
        let mut by_id: HashMap<u64, Value> = HashMap::with_capacity(responses.len());
        for response in responses {
            if let Some(err) = response.error {
                debug!(id = response.id, code = err.code, message = %err.message, "RPC entry failed");
                continue;
            }
            if let Some(result) = response.result.filter(|r| !r.is_null()) {
                by_id.insert(response.id, result);
            }
        }

        let wallet_key = self.wallet.to_prefixed_hex();
        let mut actions = Vec::new();
        let mut pools: BTreeMap<Address, TokenPoolUpdate> = BTreeMap::new();
        let pooled: Vec<&Address> = self
            .queries
            .iter()
            .filter_map(|q| match q {
                BalanceQuery::PoolContribution(token) => Some(token),
                _ => None,
            })
            .collect();

        for (i, query) in self.queries.iter().enumerate() {
            let result = by_id.get(&(i as u64 + 1));

            match query {
                BalanceQuery::NativeBalance(native_token) => {
                    let balance = amount_at(result, &["balance"]);
                    actions.push(Action::TokenBalanceUpdate {
                        address: native_token.clone(),
                        balance,
                    });
                }
                BalanceQuery::TokenBalance(token) => {
                    let balance = amount_at(result, &["balances", &wallet_key]);
                    actions.push(Action::TokenBalanceUpdate {
                        address: token.clone(),
                        balance,
                    });
                }
                BalanceQuery::Pools => {
                    let Some(entries) = result
                        .and_then(|r| r.get("pools"))
                        .and_then(Value::as_object)
                    else {
                        continue;
                    };
                    for (key, pool) in entries {
                        let Some(token) = known_token(key, &pooled) else {
                            continue;
                        };
                        let args = pool.get("arguments").and_then(Value::as_array);
                        let reserve = |idx: usize| {
                            args.and_then(|a| a.get(idx))
                                .and_then(|v| serde_json::from_value::<RawAmount>(v.clone()).ok())
                        };
                        let update = pools.entry(token).or_default();
                        update.zil_reserve = reserve(0);
                        update.token_reserve = reserve(1);
                    }
                }
                BalanceQuery::TotalContributions => {
                    let Some(entries) = result
                        .and_then(|r| r.get("total_contributions"))
                        .and_then(Value::as_object)
                    else {
                        continue;
                    };
                    for (key, total) in entries {
                        let Some(token) = known_token(key, &pooled) else {
                            continue;
                        };
                        pools.entry(token).or_default().total_contribution =
                            serde_json::from_value(total.clone()).ok();
                    }
                }
                BalanceQuery::PoolContribution(token) => {
                    let token_key = token.to_prefixed_hex();
                    let contribution = amount_at(result, &["balances", &token_key, &wallet_key]);
                    pools.entry(token.clone()).or_default().user_contribution = Some(contribution);
                }
                BalanceQuery::Delegation(operator) => {
                    let operator_key = operator.to_prefixed_hex();
                    let amount =
                        amount_at(result, &["deposit_amt_deleg", &wallet_key, &operator_key]);
                    actions.push(Action::DelegationUpdated {
                        operator: operator.clone(),
                        amount,
                    });
                }
            }
        }

        actions.extend(
            pools
                .into_iter()
                .filter(|(_, update)| !update.is_empty())
                .map(|(address, update)| Action::TokenPoolUpdate { address, update }),
        );
        actions
    }
}

fn substate(id: u64, contract: &Address, field: &str, indices: Value) -> RpcRequest {
    RpcRequest::new(
        id,
        "GetSmartContractSubState",
        json!([contract.to_hex(), field, indices]),
    )
}

/// Walk nested objects and read a raw amount; anything missing is zero.
fn amount_at(result: Option<&Value>, path: &[&str]) -> RawAmount {
    let mut current = match result {
        Some(v) => v,
        None => return RawAmount::ZERO,
    };
    for key in path {
        match current.get(*key) {
            Some(next) => current = next,
            None => return RawAmount::ZERO,
        }
    }
    serde_json::from_value(current.clone()).unwrap_or(RawAmount::ZERO)
}

/// Map a hex key of a DEX map back to a tracked token.
fn known_token(hex_key: &str, tracked: &[&Address]) -> Option<Address> {
    let address = Address::from_hex(hex_key).ok()?;
    tracked.iter().any(|t| **t == address).then_some(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn address(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from_bytes(&bytes).unwrap()
    }

    fn hex(last: u8) -> String {
        address(last).to_prefixed_hex()
    }

    fn native() -> TokenInfo {
        let mut t = TokenInfo::new(Address::native(), "ZIL", "Zilliqa", 12, dec!(1));
        t.is_zil = true;
        t
    }

    fn token(last: u8) -> TokenInfo {
        TokenInfo::new(address(last), "TKN", "Token", 12, dec!(1))
    }

    fn batch() -> PortfolioBatch {
        let tokens = vec![native(), token(1), token(2)];
        PortfolioBatch::new(address(100), address(200), address(201))
            .native_balance(&Address::native())
            .token_balances(&tokens)
            .pools(&tokens)
            .delegations([&address(50)])
    }

    fn ok(id: u64, result: Value) -> RpcResponse {
        RpcResponse {
            id,
            result: Some(result),
            error: None,
        }
    }

    #[test]
    fn test_requests_shape() {
        let batch = batch();
        // native, 2 tokens, pools, totals, 2 contributions, 1 delegation
        assert_eq!(batch.queries().len(), 8);

        let requests = batch.requests();
        assert_eq!(requests[0].method, "GetBalance");
        assert_eq!(requests[0].params, json!([address(100).to_hex()]));
        assert_eq!(
            requests[1].params,
            json!([address(1).to_hex(), "balances", [hex(100)]])
        );
        assert_eq!(
            requests[7].params,
            json!([address(201).to_hex(), "deposit_amt_deleg", [hex(100), hex(50)]])
        );
        let ids: Vec<u64> = requests.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_process_matches_by_id_and_defaults_to_zero() {
        let batch = batch();
        let wallet = hex(100);
        // Out of order; token 2 balance (id 3) missing; delegation failed.
        let responses = vec![
            ok(4, json!({ "pools": {
                hex(1): { "arguments": ["2000000000000", "1000000000000"] },
                hex(99): { "arguments": ["1", "1"] }
            }})),
            ok(2, json!({ "balances": { wallet.clone(): "500" } })),
            ok(1, json!({ "balance": "1000000000000", "nonce": 3 })),
            ok(5, json!({ "total_contributions": { hex(1): "400" } })),
            ok(6, json!({ "balances": { hex(1): { wallet.clone(): "100" } } })),
            RpcResponse {
                id: 8,
                result: None,
                error: Some(crate::chain::RpcErrorBody {
                    code: -5,
                    message: "Address not found".into(),
                }),
            },
        ];

        let actions = batch.process(responses);

        let balance_of = |addr: &Address| {
            actions.iter().find_map(|a| match a {
                Action::TokenBalanceUpdate { address, balance } if address == addr => {
                    Some(*balance)
                }
                _ => None,
            })
        };
        assert_eq!(
            balance_of(&Address::native()),
            Some(RawAmount::new(1_000_000_000_000))
        );
        assert_eq!(balance_of(&address(1)), Some(RawAmount::new(500)));
        assert_eq!(balance_of(&address(2)), Some(RawAmount::ZERO));

        assert!(actions.iter().any(|a| matches!(
            a,
            Action::DelegationUpdated { amount, .. } if amount.is_zero()
        )));

        let pool_updates: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::TokenPoolUpdate { address, update } => Some((address.clone(), update.clone())),
                _ => None,
            })
            .collect();
        // Untracked pool (99) is dropped; token 2 still reports a zero contribution.
        assert_eq!(pool_updates.len(), 2);
        let (addr, update) = &pool_updates[0];
        assert_eq!(addr, &address(1));
        assert_eq!(update.zil_reserve, Some(RawAmount::new(2_000_000_000_000)));
        assert_eq!(update.token_reserve, Some(RawAmount::new(1_000_000_000_000)));
        assert_eq!(update.total_contribution, Some(RawAmount::new(400)));
        assert_eq!(update.user_contribution, Some(RawAmount::new(100)));
        assert_eq!(pool_updates[1].1.user_contribution, Some(RawAmount::ZERO));
    }

    #[test]
    fn test_native_balance_credited_to_configured_token() {
        let wzil = address(77);
        let batch = PortfolioBatch::new(address(100), address(200), address(201))
            .native_balance(&wzil);
        assert_eq!(batch.requests()[0].method, "GetBalance");

        let actions = batch.process(vec![ok(1, json!({ "balance": "42" }))]);
        assert_eq!(
            actions,
            vec![Action::TokenBalanceUpdate {
                address: wzil,
                balance: RawAmount::new(42),
            }]
        );
    }
}
