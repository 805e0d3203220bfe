//! Data polling for ZilStream.
//!
//! - `TokenApiClient`: token list and metadata (REST)
//! - `RateClient`: ZIL fiat rates (REST)
//! - `ChainClient`: balances, pools, delegations and block height
//!   (batched JSON-RPC)
//! - `DataPoller`: turns fetch results into store actions; failures are
//!   logged and yield no actions

pub mod batch;
pub mod chain;
pub mod error;
pub mod poller;
pub mod rates;
pub mod source;
pub mod tokens;

pub use batch::{BalanceQuery, PortfolioBatch};
pub use chain::{ChainClient, RpcRequest, RpcResponse};
pub use error::{FeedError, FeedResult};
pub use poller::{ChainContracts, DataPoller};
pub use rates::RateClient;
pub use source::{ChainSource, RateSource, TokenSource};
pub use tokens::TokenApiClient;
