//! Wallet connection for ZilStream.
//!
//! Three providers are supported:
//! - ZilPay: an injected wallet bridge (`InjectedWallet`)
//! - Zeeves: a session-based bridge (`SessionWallet`)
//! - Avatar: read-only login resolving a username to an address over HTTP
//!
//! `WalletHub` routes a connect request to the matching connector and
//! remembers which provider was used.

pub mod avatar;
pub mod bridge;
pub mod connector;
pub mod error;
pub mod hub;

pub use avatar::{AvatarClient, AvatarConnector};
pub use bridge::{InjectedWallet, SessionWallet, WalletSession, WatchWallet};
pub use connector::{WalletConnection, WalletConnector, ZeevesConnector, ZilPayConnector};
pub use error::{WalletError, WalletResult};
pub use hub::WalletHub;
