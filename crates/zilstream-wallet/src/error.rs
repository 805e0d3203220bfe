//! Wallet error types.

use thiserror::Error;
use zilstream_core::{CoreError, ProviderKind};
use zilstream_persistence::PersistenceError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{0} wallet is not available")]
    ProviderUnavailable(ProviderKind),

    #[error("Connection request was rejected")]
    UserRejected,

    #[error("Wallet session mismatch: {0}")]
    SessionMismatch(String),

    #[error("Couldn't find your avatar")]
    AvatarNotFound,

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] CoreError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

pub type WalletResult<T> = Result<T, WalletError>;
