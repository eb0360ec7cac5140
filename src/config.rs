use crate::error::{PayoutError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunables for the gateway, adapters and dispatcher.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// How long to wait for an injected TRON wallet to report readiness.
    pub tron_readiness_timeout_ms: u64,
    pub tron_readiness_interval_ms: u64,
    /// Interval of the TRON account poll that stands in for change events.
    pub tron_poll_interval_ms: u64,
    /// Fee ceiling attached to TRC-20 transfers, in sun.
    pub tron_fee_limit_sun: u64,
    /// Network every EVM payout must run on when the request names none.
    pub default_evm_network: Option<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            tron_readiness_timeout_ms: 3_000,
            tron_readiness_interval_ms: 200,
            tron_poll_interval_ms: 2_000,
            tron_fee_limit_sun: 100_000_000,
            default_evm_network: None,
        }
    }
}

impl DispatcherConfig {
    /// Loads a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| PayoutError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.tron_readiness_interval_ms == 0 || self.tron_poll_interval_ms == 0 {
            return Err(PayoutError::Config(
                "poll intervals must be greater than zero".to_string(),
            ));
        }
        if self.tron_readiness_interval_ms > self.tron_readiness_timeout_ms {
            return Err(PayoutError::Config(
                "tron_readiness_interval_ms must not exceed tron_readiness_timeout_ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tron_readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.tron_readiness_timeout_ms)
    }

    pub fn tron_readiness_interval(&self) -> Duration {
        Duration::from_millis(self.tron_readiness_interval_ms)
    }

    pub fn tron_poll_interval(&self) -> Duration {
        Duration::from_millis(self.tron_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.tron_readiness_timeout(), Duration::from_secs(3));
        assert_eq!(config.tron_readiness_interval(), Duration::from_millis(200));
        assert_eq!(config.default_evm_network, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            DispatcherConfig::from_json(r#"{ "default_evm_network": "0x1", "tron_fee_limit_sun": 5 }"#)
                .unwrap();
        assert_eq!(config.default_evm_network.as_deref(), Some("0x1"));
        assert_eq!(config.tron_fee_limit_sun, 5);
        assert_eq!(config.tron_readiness_timeout_ms, 3_000);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_intervals() {
        assert!(matches!(
            DispatcherConfig::from_json(r#"{ "retries": 3 }"#),
            Err(PayoutError::Config(_))
        ));
        assert!(matches!(
            DispatcherConfig::from_json(r#"{ "tron_readiness_interval_ms": 0 }"#),
            Err(PayoutError::Config(_))
        ));
    }
}
