//! State store and derivation layer for ZilStream.
//!
//! - `Action` / `reduce`: the only way state changes
//! - `Store` / `StoreHandle`: owned root state with a change report per dispatch
//! - `portfolio`: pure valuations computed fresh from a state snapshot

pub mod action;
pub mod changes;
pub mod portfolio;
pub mod reducer;
pub mod store;

pub use action::Action;
pub use changes::{Change, Changes};
pub use portfolio::{
    balance_rows, pool_positions, portfolio_view, staking_positions, summarize, token_apr,
    total_zil, value_token, BalanceRow, PoolPosition, PortfolioSummary, PortfolioView,
    StakingPosition, TokenValuation,
};
pub use reducer::reduce;
pub use store::{Store, StoreHandle};
