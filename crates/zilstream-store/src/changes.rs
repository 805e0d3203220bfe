//! Change report returned by every dispatch.
//!
//! Slice flags drive persistence; event flags drive the dependent fetches
//! (a new block re-polls balances, a newly selected wallet loads its
//! portfolio, ...).

use std::fmt;

/// One kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Change {
    Blockchain = 1 << 0,
    Account = 1 << 1,
    Token = 1 << 2,
    Currency = 1 << 3,
    Staking = 1 << 4,
    Alert = 1 << 5,
    Settings = 1 << 6,
    Notification = 1 << 7,
    /// Block height moved forward.
    NewBlock = 1 << 8,
    /// Token list went from empty to initialized.
    TokensInitialized = 1 << 9,
    /// Selected wallet changed (including to none).
    WalletSelected = 1 << 10,
    /// Staking operator list replaced.
    OperatorsLoaded = 1 << 11,
    Favorites = 1 << 12,
    CurrencySelected = 1 << 13,
}

const ALL: [Change; 14] = [
    Change::Blockchain,
    Change::Account,
    Change::Token,
    Change::Currency,
    Change::Staking,
    Change::Alert,
    Change::Settings,
    Change::Notification,
    Change::NewBlock,
    Change::TokensInitialized,
    Change::WalletSelected,
    Change::OperatorsLoaded,
    Change::Favorites,
    Change::CurrencySelected,
];

/// Set of changes.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes(u16);

impl Changes {
    pub const NONE: Self = Self(0);

    #[inline]
    pub fn insert(&mut self, change: Change) {
        self.0 |= change as u16;
    }

    #[inline]
    pub fn with(mut self, change: Change) -> Self {
        self.insert(change);
        self
    }

    #[inline]
    pub fn contains(&self, change: Change) -> bool {
        self.0 & change as u16 != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn merge(&mut self, other: Changes) {
        self.0 |= other.0;
    }

    pub fn iter(&self) -> impl Iterator<Item = Change> + '_ {
        ALL.iter().copied().filter(|c| self.contains(*c))
    }
}

impl From<Change> for Changes {
    fn from(c: Change) -> Self {
        Self(c as u16)
    }
}

impl fmt::Debug for Changes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
