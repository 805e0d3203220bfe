//! Application configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zilstream_core::{Address, Network, Operator};
use zilstream_dashboard::DashboardConfig;
use zilstream_feed::ChainContracts;
use zilstream_telemetry::DEFAULT_FILTER;

use crate::error::{AppError, AppResult};

/// HTTP endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Token metadata API base URL (`GET {api_url}/tokens`).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Exchange rate endpoint.
    #[serde(default = "default_rates_url")]
    pub rates_url: String,
    /// Zilliqa JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Avatar lookup base URL (`GET {avatar_url}/{name}`).
    #[serde(default = "default_avatar_url")]
    pub avatar_url: String,
}

fn default_api_url() -> String {
    "https://api.zilstream.com".to_string()
}

fn default_rates_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price".to_string()
}

fn default_rpc_url() -> String {
    "https://api.zilliqa.com".to_string()
}

fn default_avatar_url() -> String {
    "https://api.carbontoken.info/api/v1/avatar".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            rates_url: default_rates_url(),
            rpc_url: default_rpc_url(),
            avatar_url: default_avatar_url(),
        }
    }
}

/// On-chain contracts. Addresses may be bech32 or `0x` hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// DEX contract holding pool reserves and contributions.
    #[serde(default = "default_dex")]
    pub dex: String,
    /// Staking contract holding `deposit_amt_deleg`.
    #[serde(default = "default_staking")]
    pub staking: String,
    /// Address the token API uses for native ZIL.
    #[serde(default = "default_native_token")]
    pub native_token: String,
}

fn default_dex() -> String {
    "0xba11eb7bcc0a02e947acf03cc651bfaf19c9ec00".to_string()
}

fn default_staking() -> String {
    "0xa7c67d49c82c7dc1b73d231640b2e4d0661d37c1".to_string()
}

fn default_native_token() -> String {
    "0x0000000000000000000000000000000000000000".to_string()
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            dex: default_dex(),
            staking: default_staking(),
            native_token: default_native_token(),
        }
    }
}

/// Poll intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Exchange rate refresh (seconds). Default: 20.
    #[serde(default = "default_rate_refresh_secs")]
    pub rate_refresh_secs: u64,
    /// Block height poll (seconds). Default: 30.
    #[serde(default = "default_block_poll_secs")]
    pub block_poll_secs: u64,
}

fn default_rate_refresh_secs() -> u64 {
    20
}

fn default_block_poll_secs() -> u64 {
    30
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            rate_refresh_secs: default_rate_refresh_secs(),
            block_poll_secs: default_block_poll_secs(),
        }
    }
}

impl IntervalConfig {
    pub fn rate_refresh(&self) -> Duration {
        Duration::from_secs(self.rate_refresh_secs)
    }

    pub fn block_poll(&self) -> Duration {
        Duration::from_secs(self.block_poll_secs)
    }
}

/// Local state storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding one file per stored key.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "./data/zilstream".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

/// Wallet bridge configuration.
///
/// The watch address stands in for an injected ZilPay provider: connecting
/// with `zilpay` yields this address on `network`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub watch_address: Option<String>,
    #[serde(default)]
    pub network: Network,
}

/// Staking operator entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub address: String,
    pub name: String,
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fiat currencies to fetch. USD is always included.
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub contracts: ContractConfig,
    #[serde(default)]
    pub intervals: IntervalConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Staking operators whose delegations are tracked.
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

fn default_currencies() -> Vec<String> {
    ["usd", "eur", "gbp", "jpy", "sgd"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currencies: default_currencies(),
            endpoints: EndpointConfig::default(),
            contracts: ContractConfig::default(),
            intervals: IntervalConfig::default(),
            persistence: PersistenceConfig::default(),
            telemetry: TelemetryConfig::default(),
            wallet: WalletConfig::default(),
            operators: Vec::new(),
            dashboard: DashboardConfig::default(),
        }
    }
}

/// Accept bech32 (`zil1...`) or hex (`0x...`).
fn parse_address(field: &str, value: &str) -> AppResult<Address> {
    let value = value.trim();
    let parsed = if value.starts_with("0x") || value.starts_with("0X") {
        Address::from_hex(value)
    } else {
        Address::parse(value)
    };
    parsed.map_err(|e| AppError::Config(format!("Invalid {field} address: {e}")))
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would fail later at runtime.
    pub fn validate(&self) -> AppResult<()> {
        if self.intervals.rate_refresh_secs == 0 || self.intervals.block_poll_secs == 0 {
            return Err(AppError::Config(
                "Poll intervals must be at least 1 second".to_string(),
            ));
        }
        self.dashboard.validate().map_err(AppError::Config)?;
        self.contracts()?;
        self.operators()?;
        self.watch_address()?;
        Ok(())
    }

    pub fn contracts(&self) -> AppResult<ChainContracts> {
        Ok(ChainContracts {
            dex: parse_address("dex", &self.contracts.dex)?,
            staking: parse_address("staking", &self.contracts.staking)?,
            native_token: parse_address("native token", &self.contracts.native_token)?,
        })
    }

    pub fn operators(&self) -> AppResult<Vec<Operator>> {
        self.operators
            .iter()
            .map(|o| Ok(Operator::new(parse_address("operator", &o.address)?, &o.name)))
            .collect()
    }

    pub fn watch_address(&self) -> AppResult<Option<Address>> {
        self.wallet
            .watch_address
            .as_deref()
            .map(|a| parse_address("watch", a))
            .transpose()
    }
}
