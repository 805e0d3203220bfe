//! Core domain types for the ZilStream portfolio tracker.
//!
//! This crate provides the entities shared by every other crate:
//! - `Address`: bech32 account/contract address with hex conversion
//! - `RawAmount`: on-chain integer amount with decimal compression
//! - `TokenInfo`, `TokenPool`: token metadata, rates and pool snapshot
//! - `Wallet`, `Alert`, `Operator`: user-facing records
//! - `state`: the slices held by the store and persisted locally

pub mod account;
pub mod address;
pub mod alert;
pub mod amount;
pub mod error;
pub mod format;
pub mod settings;
pub mod staking;
pub mod state;
pub mod token;

pub use account::{Network, ProviderKind, Wallet};
pub use address::Address;
pub use alert::{Alert, Indicator, Metric};
pub use amount::{RawAmount, ZIL_DECIMALS};
pub use error::{CoreError, Result};
pub use format::{crypto_format, currency_format, money_format};
pub use settings::{CurrencyRate, Notification, NotificationPermission};
pub use staking::Operator;
pub use state::{
    AccountState, AlertState, BlockchainState, CurrencyState, NotificationState, RootState,
    SettingsState, StakingState, TokenState,
};
pub use token::{TokenInfo, TokenPool, TokenPoolUpdate, TokenReward, TokenUpdate};
