//! User preferences, fiat rates and notification records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Permission to emit local notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    /// Not asked yet; treated as not granted.
    #[default]
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// ZIL price in one fiat currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// Uppercase currency code (e.g. "USD").
    pub code: String,
    pub rate: Decimal,
}

impl CurrencyRate {
    pub fn new(code: impl Into<String>, rate: Decimal) -> Self {
        Self {
            code: code.into().to_uppercase(),
            rate,
        }
    }
}

/// A fired notification, kept in the notification history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub token_address: Option<Address>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            token_address: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_token(mut self, address: Address) -> Self {
        self.token_address = Some(address);
        self
    }
}
