//! Price alerts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::address::Address;
use crate::error::CoreError;

/// Value an alert watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Price in USD.
    Price,
    /// Price in ZIL.
    PriceZil,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Price => "Price (USD)",
            Self::PriceZil => "Price (ZIL)",
        }
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" | "usd" => Ok(Self::Price),
            "price_zil" | "zil" => Ok(Self::PriceZil),
            _ => Err(CoreError::UnknownVariant {
                kind: "metric",
                value: s.to_string(),
            }),
        }
    }
}

/// Threshold direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Above,
    Below,
}

impl Indicator {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Above => "Above",
            Self::Below => "Below",
        }
    }

    /// Whether `current` satisfies the threshold in this direction.
    pub fn is_met(&self, current: Decimal, threshold: Decimal) -> bool {
        match self {
            Self::Above => current >= threshold,
            Self::Below => current <= threshold,
        }
    }
}

impl FromStr for Indicator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            _ => Err(CoreError::UnknownVariant {
                kind: "indicator",
                value: s.to_string(),
            }),
        }
    }
}

/// User-configured price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub token_address: Address,
    pub metric: Metric,
    pub indicator: Indicator,
    pub value: Decimal,
    #[serde(default)]
    pub triggered: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub triggered_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn new(token_address: Address, metric: Metric, indicator: Indicator, value: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_address,
            metric,
            indicator,
            value,
            triggered: false,
            created_at: Utc::now(),
            triggered_at: None,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.metric.label(),
            self.indicator.label().to_lowercase(),
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_indicator_is_met() {
        assert!(Indicator::Above.is_met(dec!(6), dec!(5)));
        assert!(Indicator::Above.is_met(dec!(5), dec!(5)));
        assert!(!Indicator::Above.is_met(dec!(4), dec!(5)));

        assert!(Indicator::Below.is_met(dec!(4), dec!(5)));
        assert!(Indicator::Below.is_met(dec!(5), dec!(5)));
        assert!(!Indicator::Below.is_met(dec!(6), dec!(5)));
    }

    #[test]
    fn test_parse_metric_and_indicator() {
        assert_eq!("usd".parse::<Metric>().unwrap(), Metric::Price);
        assert_eq!("price_zil".parse::<Metric>().unwrap(), Metric::PriceZil);
        assert_eq!("Below".parse::<Indicator>().unwrap(), Indicator::Below);
        assert!("sideways".parse::<Indicator>().is_err());
    }

    #[test]
    fn test_display() {
        let addr = Address::native();
        let alert = Alert::new(addr, Metric::PriceZil, Indicator::Above, dec!(5));
        assert_eq!(alert.to_string(), "Price (ZIL) above 5");
        assert!(!alert.triggered);
    }
}
