use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;

/// Which upstream backend serves raw sales rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesSource {
    Rest,
    GraphQl,
}

impl FromStr for SalesSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rest" => Ok(SalesSource::Rest),
            "graphql" => Ok(SalesSource::GraphQl),
            other => Err(AppError::Config(format!(
                "Invalid SALES_SOURCE: {}. Must be 'rest' or 'graphql'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub sales_source: SalesSource,
    pub pos_api_url: String,
    pub upstream_timeout: Duration,
    pub mock_fallback: bool,
    pub failure_ttl: chrono::Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            sales_source: SalesSource::Rest,
            pos_api_url: "http://host.docker.internal:3001".to_string(),
            upstream_timeout: Duration::from_secs(10),
            mock_fallback: true,
            failure_ttl: chrono::Duration::minutes(5),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| AppError::Config(format!("BIND_ADDR '{}': {}", raw, e)))?,
            None => defaults.bind_addr,
        };

        let sales_source = match lookup("SALES_SOURCE") {
            Some(raw) => raw.parse()?,
            None => defaults.sales_source,
        };

        let pos_api_url = lookup("POS_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.pos_api_url);
        url::Url::parse(&pos_api_url)
            .map_err(|e| AppError::Config(format!("POS_API_URL '{}': {}", pos_api_url, e)))?;

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number(&raw, "UPSTREAM_TIMEOUT_SECS")?),
            None => defaults.upstream_timeout,
        };

        let mock_fallback = match lookup("MOCK_FALLBACK") {
            Some(raw) => raw.parse::<bool>().map_err(|_| {
                AppError::Config(format!("MOCK_FALLBACK must be true or false, got '{}'", raw))
            })?,
            None => defaults.mock_fallback,
        };

        let failure_ttl = match lookup("FAILURE_TTL_MINUTES") {
            Some(raw) => chrono::Duration::minutes(parse_number(&raw, "FAILURE_TTL_MINUTES")? as i64),
            None => defaults.failure_ttl,
        };

        Ok(Self {
            bind_addr,
            sales_source,
            pos_api_url,
            upstream_timeout,
            mock_fallback,
            failure_ttl,
        })
    }
}

fn parse_number(raw: &str, key: &str) -> Result<u64, AppError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| AppError::Config(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.sales_source, SalesSource::Rest);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert!(config.mock_fallback);
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SALES_SOURCE", "GraphQL"),
            ("POS_API_URL", "http://localhost:4000/"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("MOCK_FALLBACK", "false"),
            ("FAILURE_TTL_MINUTES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.sales_source, SalesSource::GraphQl);
        assert_eq!(config.pos_api_url, "http://localhost:4000");
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert!(!config.mock_fallback);
        assert_eq!(config.failure_ttl, chrono::Duration::zero());
    }

    #[test]
    fn test_invalid_source_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("SALES_SOURCE", "soap")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("UPSTREAM_TIMEOUT_SECS", "-1")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
