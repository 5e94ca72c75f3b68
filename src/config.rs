//! Configuration for the data layer and its store.

use crate::error::{Error, Result};
use crate::format::CurrencyFormat;
use crate::observability::TtlPolicy;
use std::env;
use std::time::Duration;

/// Default number of rows in the "latest invoices" panel.
pub const DEFAULT_LATEST_INVOICES: usize = 5;
/// Default number of rows in the "top products" panel.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Data layer settings.
///
/// # Example
///
/// ```
/// use dashboard_kit::config::DashboardConfig;
/// use dashboard_kit::format::CurrencyFormat;
///
/// let config = DashboardConfig::default()
///     .with_latest_invoices(10)
///     .with_currency(CurrencyFormat::rupiah());
/// assert_eq!(config.latest_invoices, 10);
/// ```
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub latest_invoices: usize,
    pub top_products: usize,
    pub currency: CurrencyFormat,
    /// Lifetime of cached page views.
    pub page_ttl: TtlPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            latest_invoices: DEFAULT_LATEST_INVOICES,
            top_products: DEFAULT_TOP_PRODUCTS,
            currency: CurrencyFormat::default(),
            page_ttl: TtlPolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_latest_invoices(mut self, limit: usize) -> Self {
        self.latest_invoices = limit;
        self
    }

    pub fn with_top_products(mut self, limit: usize) -> Self {
        self.top_products = limit;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_page_ttl(mut self, policy: TtlPolicy) -> Self {
        self.page_ttl = policy;
        self
    }
}

/// Connection settings for a SQL store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(url: impl Into<String>) -> Self {
        DatabaseConfig {
            url: url.into(),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Self::DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Read `DATABASE_URL` and optional `DATABASE_MAX_CONNECTIONS`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the URL is missing or the connection
    /// count is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup("DATABASE_URL")
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::ConfigError("DATABASE_URL must be set".to_string()))?;

        let mut config = DatabaseConfig::new(url);
        if let Some(raw) = lookup("DATABASE_MAX_CONNECTIONS") {
            let max: u32 = raw.trim().parse().map_err(|_| {
                Error::ConfigError(format!("DATABASE_MAX_CONNECTIONS: invalid value {:?}", raw))
            })?;
            if max == 0 {
                return Err(Error::ConfigError(
                    "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
                ));
            }
            config.max_connections = max;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.latest_invoices, 5);
        assert_eq!(config.top_products, 5);
        assert_eq!(config.currency, CurrencyFormat::default());
    }

    #[test]
    fn test_database_config_from_env() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/dashboard"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert_eq!(config.url, "postgres://localhost/dashboard");
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn test_database_config_defaults_pool_size() {
        let config =
            DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])).unwrap();
        assert_eq!(config.max_connections, DatabaseConfig::DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn test_database_config_errors() {
        assert!(matches!(
            DatabaseConfig::from_lookup(lookup(&[])),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            DatabaseConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://db"),
                ("DATABASE_MAX_CONNECTIONS", "0"),
            ])),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            DatabaseConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://db"),
                ("DATABASE_MAX_CONNECTIONS", "many"),
            ])),
            Err(Error::ConfigError(_))
        ));
    }
}
