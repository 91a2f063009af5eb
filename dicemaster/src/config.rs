use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RollError;

pub const DEFAULT_REFRESH_SECS: u64 = 12;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_DICE: u32 = 1000;

/// Upper bounds on a single roll. Anything above them is rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_dice_count: u32,
    pub max_dice_faces: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_dice_count: DEFAULT_MAX_DICE,
            max_dice_faces: DEFAULT_MAX_DICE,
        }
    }
}

impl Limits {
    pub fn check(&self, count: u32, faces: u32) -> Result<(), RollError> {
        if count > self.max_dice_count || faces > self.max_dice_faces {
            return Err(RollError::LimitExceeded {
                count,
                faces,
                max_count: self.max_dice_count,
                max_faces: self.max_dice_faces,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint of an Ethereum node. `None` runs without external entropy.
    pub eth_rpc_url: Option<String>,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub limits: Limits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eth_rpc_url: None,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            limits: Limits::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("ETH_RPC_URL").filter(|url| !url.trim().is_empty()) {
            config.eth_rpc_url = Some(url.trim().to_string());
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "DICEMASTER_REFRESH_SECS")? {
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "DICEMASTER_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<u32>(&lookup, "DICEMASTER_MAX_DICE_COUNT")? {
            config.limits.max_dice_count = max;
        }
        if let Some(max) = parse_var::<u32>(&lookup, "DICEMASTER_MAX_DICE_FACES")? {
            config.limits.max_dice_faces = max;
        }

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => {
            let parsed = value
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}"))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup_from(&[]))?;
        assert_eq!(config, Config::default());
        assert_eq!(config.refresh_interval, Duration::from_secs(12));
        assert_eq!(config.limits.max_dice_count, 1000);
        assert_eq!(config.limits.max_dice_faces, 1000);
        Ok(())
    }

    #[test]
    fn test_overrides() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup_from(&[
            ("ETH_RPC_URL", " https://rpc.example.org "),
            ("DICEMASTER_REFRESH_SECS", "30"),
            ("DICEMASTER_MAX_DICE_COUNT", "50"),
        ]))?;
        assert_eq!(config.eth_rpc_url.as_deref(), Some("https://rpc.example.org"));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.limits.max_dice_count, 50);
        assert_eq!(config.limits.max_dice_faces, 1000);
        Ok(())
    }

    #[test]
    fn test_blank_url_is_unset() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup_from(&[("ETH_RPC_URL", "  ")]))?;
        assert_eq!(config.eth_rpc_url, None);
        Ok(())
    }

    #[test]
    fn test_invalid_number() {
        let result = Config::from_lookup(lookup_from(&[("DICEMASTER_MAX_DICE_FACES", "many")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_limits() {
        let limits = Limits::default();
        assert!(limits.check(1000, 1000).is_ok());
        assert!(limits.check(1001, 6).unwrap_err().is_limit_exceeded());
        assert!(limits.check(1, 1001).unwrap_err().is_limit_exceeded());
    }
}
