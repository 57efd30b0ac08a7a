//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use checkout::StockStrategy;
use thiserror::Error;

/// Which service this process runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceMode {
    Cart,
    Catalog,
    Orders,
    /// Every service in one process, with the order workflow calling the
    /// cart and catalog stores directly.
    #[default]
    All,
}

impl ServiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMode::Cart => "cart",
            ServiceMode::Catalog => "catalog",
            ServiceMode::Orders => "orders",
            ServiceMode::All => "all",
        }
    }
}

impl std::fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cart" => Ok(ServiceMode::Cart),
            "catalog" | "products" => Ok(ServiceMode::Catalog),
            "orders" => Ok(ServiceMode::Orders),
            "all" => Ok(ServiceMode::All),
            _ => Err(ConfigError::Invalid {
                key: "SERVICE",
                value: s.to_string(),
            }),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `SERVICE`: `cart`, `catalog`, `orders` or `all` (default: `all`)
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `AUTH_SERVICE_URL`, `CART_SERVICE_URL`, `PRODUCTS_SERVICE_URL`
/// - `UPSTREAM_TIMEOUT_SECS` (default: `5`), `AUTH_TIMEOUT_SECS` (default: `2`)
/// - `IDENTITY_CACHE_TTL_SECS` (default: `300`)
/// - `STOCK_STRATEGY`: `overwrite` or `conditional` (default: `overwrite`)
#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceMode,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub auth_service_url: String,
    pub cart_service_url: String,
    pub products_service_url: String,
    pub upstream_timeout: Duration,
    pub auth_timeout: Duration,
    pub identity_cache_ttl: Duration,
    pub stock_strategy: StockStrategy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Unparseable numbers fall back to their defaults; unknown enum values
    /// are rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let service = match lookup("SERVICE") {
            Some(v) => v.parse()?,
            None => defaults.service,
        };
        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            None => defaults.log_format,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "text" || v == "pretty" => LogFormat::Text,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: v,
                });
            }
        };
        let stock_strategy = match lookup("STOCK_STRATEGY") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "STOCK_STRATEGY",
                value: v,
            })?,
            None => defaults.stock_strategy,
        };

        Ok(Self {
            service,
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            auth_service_url: lookup("AUTH_SERVICE_URL").unwrap_or(defaults.auth_service_url),
            cart_service_url: lookup("CART_SERVICE_URL").unwrap_or(defaults.cart_service_url),
            products_service_url: lookup("PRODUCTS_SERVICE_URL")
                .unwrap_or(defaults.products_service_url),
            upstream_timeout: secs("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout),
            auth_timeout: secs("AUTH_TIMEOUT_SECS", defaults.auth_timeout),
            identity_cache_ttl: secs("IDENTITY_CACHE_TTL_SECS", defaults.identity_cache_ttl),
            stock_strategy,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceMode::All,
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            auth_service_url: "http://localhost:8000".to_string(),
            products_service_url: "http://localhost:8001".to_string(),
            cart_service_url: "http://localhost:8002".to_string(),
            upstream_timeout: Duration::from_secs(5),
            auth_timeout: identity::DEFAULT_AUTH_TIMEOUT,
            identity_cache_ttl: identity::DEFAULT_CACHE_TTL,
            stock_strategy: StockStrategy::Overwrite,
        }
    }
}
