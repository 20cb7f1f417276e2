//! Load process configuration from environment variables.

use crate::config::types::{AllowLists, Verb};
use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "postgresql://postgres:@127.0.0.1:5432/postgres";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SCHEMA: &str = "public";

/// Everything the server needs at startup. Built once in `main` and passed down.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Schema whose base tables are exposed.
    pub schema: String,
    pub max_connections: u32,
    /// Tables never exposed even when allow-listed (migration bookkeeping).
    pub excluded_tables: Vec<String>,
    pub allow: AllowLists,
    pub startup: StartupRetry,
    pub identity: IdentityConfig,
}

/// Bounded polling of database availability before the server starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartupRetry {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for StartupRetry {
    fn default() -> Self {
        StartupRetry {
            attempts: 10,
            delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    /// OIDC-style userinfo endpoint; called with the caller's bearer token.
    pub userinfo_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let schema = get("DB_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        let max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5u32)?;
        let excluded_tables = get("EXCLUDED_TABLES")
            .map(|v| split_list(&v))
            .unwrap_or_else(|| vec!["pgmigrations".to_string()]);

        let mut allow = AllowLists::default();
        for (key, verb) in [
            ("ALLOW_GET", Verb::Get),
            ("ALLOW_POST", Verb::Post),
            ("ALLOW_PUT", Verb::Put),
            ("ALLOW_DELETE", Verb::Delete),
        ] {
            // Present-but-empty is an explicit "expose nothing" for that verb.
            if let Some(raw) = lookup(key) {
                let names = split_list(&raw);
                allow = allow.with(verb, names.iter().map(String::as_str));
            }
        }

        let defaults = StartupRetry::default();
        let attempts = parse_or("STARTUP_RETRIES", get("STARTUP_RETRIES"), defaults.attempts)?;
        if attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "STARTUP_RETRIES",
                value: "0".into(),
            });
        }
        let delay_ms = parse_or(
            "STARTUP_RETRY_DELAY_MS",
            get("STARTUP_RETRY_DELAY_MS"),
            defaults.delay.as_millis() as u64,
        )?;

        let userinfo_url = get("IDENTITY_USERINFO_URL").ok_or(ConfigError::Missing("IDENTITY_USERINFO_URL"))?;
        if !(userinfo_url.starts_with("http://") || userinfo_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "IDENTITY_USERINFO_URL",
                value: userinfo_url,
            });
        }
        let timeout_secs = parse_or("IDENTITY_TIMEOUT_SECS", get("IDENTITY_TIMEOUT_SECS"), 10u64)?;

        Ok(Config {
            database_url,
            port,
            schema,
            max_connections,
            excluded_tables,
            allow,
            startup: StartupRetry {
                attempts,
                delay: Duration::from_millis(delay_ms),
            },
            identity: IdentityConfig {
                userinfo_url,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_identity_is_set() {
        let cfg = Config::from_lookup(lookup(&[("IDENTITY_USERINFO_URL", "https://idp.test/userinfo")])).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.schema, "public");
        assert_eq!(cfg.excluded_tables, vec!["pgmigrations".to_string()]);
        assert_eq!(cfg.startup, StartupRetry::default());
        assert_eq!(cfg.identity.timeout, Duration::from_secs(10));
        assert!(cfg.allow.allows(Verb::Get, "guest"));
    }

    #[test]
    fn identity_url_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("IDENTITY_USERINFO_URL")));
    }

    #[test]
    fn identity_url_must_be_http() {
        let err = Config::from_lookup(lookup(&[("IDENTITY_USERINFO_URL", "idp.test")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "IDENTITY_USERINFO_URL", .. }));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("IDENTITY_USERINFO_URL", "http://idp"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn zero_retries_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("IDENTITY_USERINFO_URL", "http://idp"),
            ("STARTUP_RETRIES", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STARTUP_RETRIES", .. }));
    }

    #[test]
    fn allow_list_overrides_replace_one_verb() {
        let cfg = Config::from_lookup(lookup(&[
            ("IDENTITY_USERINFO_URL", "http://idp"),
            ("ALLOW_DELETE", "guest, Party"),
            ("ALLOW_PUT", ""),
        ]))
        .unwrap();
        assert!(cfg.allow.allows(Verb::Delete, "party"));
        assert!(!cfg.allow.allows(Verb::Delete, "host"));
        assert!(!cfg.allow.allows(Verb::Put, "guest"));
        assert!(cfg.allow.allows(Verb::Get, "host"));
    }

    #[test]
    fn retry_and_exclusions_are_parsed() {
        let cfg = Config::from_lookup(lookup(&[
            ("IDENTITY_USERINFO_URL", "http://idp"),
            ("STARTUP_RETRIES", "3"),
            ("STARTUP_RETRY_DELAY_MS", "50"),
            ("EXCLUDED_TABLES", "pgmigrations, audit_log"),
        ]))
        .unwrap();
        assert_eq!(cfg.startup.attempts, 3);
        assert_eq!(cfg.startup.delay, Duration::from_millis(50));
        assert_eq!(cfg.excluded_tables, vec!["pgmigrations".to_string(), "audit_log".to_string()]);
    }
}
