use serde::{Deserialize, Serialize};

use crate::models::{RebalanceConfig, RiskThresholds};

/// Process settings: risk rules plus rebalancer limits. Loaded once at
/// startup from an optional TOML file with `REBALANCE_`-prefixed environment
/// overrides (e.g. `REBALANCE_REBALANCE__MAX_DAILY_TRADES=3`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub thresholds: RiskThresholds,
    #[serde(default)]
    pub rebalance: RebalanceConfig,
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("REBALANCE").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load("does-not-exist").unwrap();
        assert!(settings.rebalance.dry_run());
        assert_eq!(settings.rebalance.max_daily_trades(), 10);
        assert!((settings.thresholds.stop_loss_pct() + 10.0).abs() < 1e-9);
    }
}
