//! Raw on-chain amounts.
//!
//! Balances and reserves arrive as unsigned integers (`Uint128` on chain,
//! strings in JSON). Human readable units are obtained by compressing with
//! the token decimals; every valuation goes through `compress` so no derived
//! value is ever cached.

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Decimals of the native ZIL token.
pub const ZIL_DECIMALS: u32 = 12;

/// Largest `Decimal` mantissa (`2^96 - 1`).
const MAX_MANTISSA: u128 = (1 << 96) - 1;

/// Largest `Decimal` scale.
const MAX_SCALE: u32 = 28;

/// Unscaled integer amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RawAmount(pub u128);

impl RawAmount {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> u128 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Scale down by `10^decimals`.
    ///
    /// The result keeps `decimals` fractional digits, so `1000` with three
    /// decimals renders as `1.000`. Amounts wider than the 96-bit decimal
    /// mantissa drop their lowest fractional digits instead; only an integer
    /// part beyond the mantissa is an error.
    pub fn compress(&self, decimals: u32) -> Result<Decimal> {
        let precision_err = || CoreError::Precision {
            amount: self.0.to_string(),
            decimals,
        };

        let mut mantissa = self.0;
        let mut scale = decimals;
        while (mantissa > MAX_MANTISSA || scale > MAX_SCALE) && scale > 0 {
            mantissa /= 10;
            scale -= 1;
        }
        if mantissa > MAX_MANTISSA {
            return Err(precision_err());
        }

        let value = i128::try_from(mantissa).map_err(|_| precision_err())?;
        Decimal::try_from_i128_with_scale(value, scale).map_err(|_| precision_err())
    }

    /// Compress, treating amounts beyond decimal precision as zero.
    pub fn compress_or_zero(&self, decimals: u32) -> Decimal {
        self.compress(decimals).unwrap_or(Decimal::ZERO)
    }

    /// Saturating sum.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Add for RawAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RawAmount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|e| CoreError::InvalidAmount(format!("{s}: {e}")))
    }
}

impl From<u128> for RawAmount {
    fn from(v: u128) -> Self {
        Self(v)
    }
}

impl Serialize for RawAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RawAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RawAmountVisitor;

        impl Visitor<'_> for RawAmountVisitor {
            type Value = RawAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<RawAmount, E> {
                Ok(RawAmount(v as u128))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<RawAmount, E> {
                Ok(RawAmount(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<RawAmount, E> {
                u128::try_from(v)
                    .map(RawAmount)
                    .map_err(|_| E::custom(format!("negative amount {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<RawAmount, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(RawAmountVisitor)
    }
}
