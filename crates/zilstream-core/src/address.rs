//! Zilliqa account and contract addresses.
//!
//! Addresses are kept in their bech32 form (`zil1...`), which is what the
//! token API and the wallets hand out. JSON-RPC calls need the 20-byte hex
//! form, so conversions in both directions live here.

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Human readable part of every Zilliqa bech32 address.
const ZIL_HRP: Hrp = Hrp::parse_unchecked("zil");

/// Address payload length in bytes.
const ADDRESS_LEN: usize = 20;

/// Bech32 encoded Zilliqa address.
///
/// Always stored lowercase so equality is a plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate a bech32 address.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Build an address from raw 20-byte payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ADDRESS_LEN {
            return Err(CoreError::InvalidAddress(format!(
                "expected {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let encoded = bech32::encode::<Bech32>(ZIL_HRP, bytes)
            .map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        Ok(Self(encoded))
    }

    /// Convert a hex address (`0x` prefix optional, any case) to bech32.
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim_start_matches("0x").trim_start_matches("0X");
        let bytes = hex::decode(trimmed)
            .map_err(|e| CoreError::InvalidAddress(format!("{s}: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// The zero address, used by the API to denote the native ZIL token.
    pub fn native() -> Self {
        // 20 zero bytes always encode
        Self::from_bytes(&[0u8; ADDRESS_LEN]).unwrap_or_else(|_| Self(String::new()))
    }

    /// Bech32 string form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase hex without `0x`, as expected for contract addresses in
    /// `GetSmartContractSubState`.
    pub fn to_hex(&self) -> String {
        match decode(&self.0) {
            Ok(bytes) => hex::encode(bytes),
            Err(_) => String::new(),
        }
    }

    /// Lowercase hex with `0x`, the key format of contract maps.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

fn decode(s: &str) -> Result<Vec<u8>> {
    let lower = s.trim().to_lowercase();
    let (hrp, data) =
        bech32::decode(&lower).map_err(|e| CoreError::InvalidAddress(format!("{s}: {e}")))?;
    if hrp != ZIL_HRP {
        return Err(CoreError::InvalidAddress(format!(
            "{s}: unexpected prefix {hrp}"
        )));
    }
    if data.len() != ADDRESS_LEN {
        return Err(CoreError::InvalidAddress(format!(
            "{s}: expected {ADDRESS_LEN} bytes, got {}",
            data.len()
        )));
    }
    Ok(data)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "0x1234567890abcdef1234567890abcdef12345678";

    #[test]
    fn test_hex_to_bech32_and_back() {
        let addr = Address::from_hex(HEX).unwrap();
        assert!(addr.as_str().starts_with("zil1"));
        assert_eq!(addr.to_prefixed_hex(), HEX);
        assert_eq!(addr.to_hex(), HEX.trim_start_matches("0x"));

        let reparsed: Address = addr.as_str().parse().unwrap();
        assert_eq!(reparsed, addr);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let addr = Address::from_hex(HEX).unwrap();
        let upper = addr.as_str().to_uppercase();
        assert_eq!(Address::parse(&upper).unwrap(), addr);
    }

    #[test]
    fn test_native_is_zero_address() {
        let native = Address::native();
        assert!(native.as_str().starts_with("zil1qqqqqqqq"));
        assert_eq!(native.to_hex(), "0".repeat(40));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Address::parse("not-an-address").is_err());
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("0xzz34567890abcdef1234567890abcdef12345678").is_err());
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let addr = Address::from_hex(HEX).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.as_str()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        assert!(serde_json::from_str::<Address>("\"zil1broken\"").is_err());
    }
}
