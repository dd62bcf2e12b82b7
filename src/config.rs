// src/config.rs
use crate::error::ConfigError;
use log::LevelFilter;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub api_key: String,
    pub log_level: LevelFilter,
    pub queue_depth: usize,
}

impl Settings {
    /// Reads settings from the process environment, after loading `.env` if
    /// one is present.
    pub fn from_env() -> Result<Settings, ConfigError> {
        // Missing .env is fine; real environment variables still apply.
        let _ = dotenvy::dotenv();
        Settings::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Settings {
            bind: parse_or("PORTFOLIO_BIND", &lookup, || {
                SocketAddr::from(([127, 0, 0, 1], 3030))
            })?,
            api_key: lookup("ALPHAVANTAGE_API_KEY").unwrap_or_else(|| "demo".to_string()),
            log_level: parse_or("PORTFOLIO_LOG", &lookup, || LevelFilter::Info)?,
            queue_depth: parse_or("PORTFOLIO_QUEUE_DEPTH", &lookup, || 100)?,
        })
    }
}

fn parse_or<T, F, D>(key: &'static str, lookup: &F, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            message: format!("cannot parse {:?}: {}", raw, e),
        }),
        _ => Ok(default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.bind, "127.0.0.1:3030".parse::<SocketAddr>().unwrap());
        assert_eq!(settings.api_key, "demo");
        assert_eq!(settings.log_level, LevelFilter::Info);
        assert_eq!(settings.queue_depth, 100);
    }

    #[test]
    fn overrides_are_parsed() {
        let settings = Settings::from_lookup(lookup(&[
            ("PORTFOLIO_BIND", "0.0.0.0:8080"),
            ("ALPHAVANTAGE_API_KEY", "secret"),
            ("PORTFOLIO_LOG", "debug"),
            ("PORTFOLIO_QUEUE_DEPTH", "16"),
        ]))
        .unwrap();
        assert_eq!(settings.bind.port(), 8080);
        assert_eq!(settings.api_key, "secret");
        assert_eq!(settings.log_level, LevelFilter::Debug);
        assert_eq!(settings.queue_depth, 16);
    }

    #[test]
    fn bad_values_name_the_key() {
        let err = Settings::from_lookup(lookup(&[("PORTFOLIO_QUEUE_DEPTH", "lots")])).unwrap_err();
        assert_eq!(err.key, "PORTFOLIO_QUEUE_DEPTH");
    }
}
