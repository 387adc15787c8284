//! Server configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Default bind address when neither `PORT` nor `THEMIND_ADDR` is set.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Process-level settings for the `themind-server` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: SocketAddr,
    /// Default log filter (trace, debug, info, warn, error). `RUST_LOG`
    /// overrides it.
    pub log_level: String,
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    ///
    /// - `PORT`: binds `0.0.0.0:$PORT` (hosting platforms set this)
    /// - `THEMIND_ADDR`: full bind address, used when `PORT` is unset
    /// - `LOG_LEVEL`: defaults to `info`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{port}"),
            None => lookup("THEMIND_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
        };

        Ok(Self {
            bind_addr: addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid server address: {0}")]
    InvalidAddress(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_port_wins_over_addr() {
        let config = load(&[("PORT", "9000"), ("THEMIND_ADDR", "127.0.0.1:7000")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_explicit_addr_and_level() {
        let config = load(&[("THEMIND_ADDR", "127.0.0.1:7000"), ("LOG_LEVEL", "debug")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid server address: 0.0.0.0:eighty");
    }
}
