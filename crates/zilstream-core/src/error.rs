//! Error types for zilstream-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount {amount} with {decimals} decimals exceeds decimal precision")]
    Precision { amount: String, decimals: u32 },

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
