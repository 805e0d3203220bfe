//! Staking operators (seed nodes) and delegations.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::RawAmount;

/// Staking operator the wallet may have delegated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub address: Address,
    pub name: String,
    /// Amount delegated by the connected wallet, in raw ZIL.
    #[serde(default)]
    pub delegated: Option<RawAmount>,
}

impl Operator {
    pub fn new(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            delegated: None,
        }
    }
}
