//! Application error types.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(#[from] zilstream_wallet::WalletError),

    #[error("Feed error: {0}")]
    Feed(#[from] zilstream_feed::FeedError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] zilstream_persistence::PersistenceError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] zilstream_telemetry::TelemetryError),

    #[error("No wallet selected")]
    NoWallet,

    #[error("Unknown token: {0}")]
    UnknownToken(zilstream_core::Address),

    #[error("Unknown alert: {0}")]
    UnknownAlert(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
