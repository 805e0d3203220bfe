//! Wallets and networks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::error::CoreError;

/// Wallet provider a wallet was connected through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Browser-injected provider exposing `connect()` (ZilPay).
    ZilPay,
    /// Browser-injected provider exposing `getSession()` (Zeeves).
    Zeeves,
    /// Remote lookup of an Avatar name.
    Avatar,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ZilPay => "zilpay",
            Self::Zeeves => "zeeves",
            Self::Avatar => "avatar",
        };
        f.write_str(s)
    }
}

impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zilpay" => Ok(Self::ZilPay),
            "zeeves" => Ok(Self::Zeeves),
            "avatar" => Ok(Self::Avatar),
            _ => Err(CoreError::UnknownVariant {
                kind: "provider",
                value: s.to_string(),
            }),
        }
    }
}

/// Zilliqa network selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Private,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Private => "private",
        };
        f.write_str(s)
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "private" => Ok(Self::Private),
            _ => Err(CoreError::UnknownVariant {
                kind: "network",
                value: s.to_string(),
            }),
        }
    }
}

/// A wallet known to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: Address,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    #[serde(default)]
    pub is_connected: bool,
}

impl Wallet {
    pub fn new(address: Address, kind: ProviderKind) -> Self {
        Self {
            address,
            kind,
            is_connected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("ZilPay".parse::<ProviderKind>().unwrap(), ProviderKind::ZilPay);
        assert_eq!("avatar".parse::<ProviderKind>().unwrap(), ProviderKind::Avatar);
        assert!("metamask".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_network_roundtrip() {
        for n in [Network::Mainnet, Network::Testnet, Network::Private] {
            assert_eq!(n.to_string().parse::<Network>().unwrap(), n);
        }
    }

    #[test]
    fn test_wallet_serde_uses_type_key() {
        let addr = Address::from_hex("0x00000000000000000000000000000000000000bb").unwrap();
        let w = Wallet::new(addr, ProviderKind::Zeeves);
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "zeeves");
        assert_eq!(json["is_connected"], false);
    }
}
