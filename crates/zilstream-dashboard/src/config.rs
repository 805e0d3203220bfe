//! Dashboard configuration.
//!
//! The dashboard exposes wallet balances, so it binds to loopback unless
//! told otherwise and can sit behind basic auth.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `[dashboard]` section of the tracker config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Interface to bind. Use `0.0.0.0` to reach the page from other hosts.
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// How often connected pages receive a fresh portfolio.
    #[serde(default = "default_push_interval_ms")]
    pub push_interval_ms: u64,
    /// Concurrent WebSocket clients.
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Basic auth; the page is open when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<DashboardAuth>,
}

/// Basic auth credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAuth {
    pub username: String,
    pub password: String,
}

impl DashboardAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `username:password`, as carried in the Authorization header.
    pub(crate) fn credentials(&self) -> String {
        format!("{}:{}", self.username, self.password)
    }
}

fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}

// Prices move on the 20s rate poll; faster pushes only resend the same view.
fn default_push_interval_ms() -> u64 {
    5000
}

fn default_max_clients() -> usize {
    4
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: default_bind(),
            port: default_port(),
            push_interval_ms: default_push_interval_ms(),
            max_clients: default_max_clients(),
            auth: None,
        }
    }
}

impl DashboardConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn push_interval(&self) -> Duration {
        Duration::from_millis(self.push_interval_ms)
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.push_interval_ms == 0 {
            return Err("dashboard push_interval_ms must be positive".to_string());
        }
        if self.max_clients == 0 {
            return Err("dashboard max_clients must be at least 1".to_string());
        }
        if let Some(auth) = &self.auth {
            if auth.username.is_empty() || auth.password.is_empty() {
                return Err("dashboard auth needs both username and password".to_string());
            }
            if auth.username.contains(':') {
                return Err("dashboard auth username cannot contain ':'".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_stay_local() {
        let config = DashboardConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.push_interval(), Duration::from_secs(5));
        assert!(!config.auth_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_with_auth() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{
                "enabled": true,
                "bind": "0.0.0.0",
                "port": 9000,
                "auth": { "username": "me", "password": "pw" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.max_clients, 4);
        assert_eq!(config.auth, Some(DashboardAuth::new("me", "pw")));
        assert_eq!(config.auth.unwrap().credentials(), "me:pw");
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        let zero_interval = DashboardConfig {
            push_interval_ms: 0,
            ..Default::default()
        };
        assert!(zero_interval.validate().is_err());

        let no_clients = DashboardConfig {
            max_clients: 0,
            ..Default::default()
        };
        assert!(no_clients.validate().is_err());

        let half_auth = DashboardConfig {
            auth: Some(DashboardAuth::new("me", "")),
            ..Default::default()
        };
        assert!(half_auth.validate().is_err());

        let colon_user = DashboardConfig {
            auth: Some(DashboardAuth::new("a:b", "pw")),
            ..Default::default()
        };
        assert!(colon_user.validate().is_err());
    }
}
