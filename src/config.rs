//! Application configuration
//!
//! Aggregates every tunable of a run so a whole scenario can be loaded from a
//! single JSON file. Missing fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backtesting::simulator::SimulationConfig;
use crate::error::{validate_horizon, SimError};
use crate::projection::benchmark::BenchmarkConfig;
use crate::projection::goal::GoalConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub benchmark: BenchmarkConfig,
    pub goal: GoalConfig,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no user-facing run should start with
    pub fn validate(&self) -> Result<(), SimError> {
        validate_horizon(self.simulation.days)?;
        self.simulation.validate()?;
        self.benchmark.validate()?;
        self.goal.validate()?;

        if self.benchmark.instruments.is_empty() {
            return Err(SimError::ConfigError(
                "At least one benchmark instrument is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.days, 365);
        assert_eq!(config.benchmark.instruments.len(), 3);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = write_config(
            r#"{
                "simulation": { "initial_bankroll": 250.0, "days": 90, "start_date": "2024-03-01" },
                "seed": 42
            }"#,
        );

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.simulation.initial_bankroll, 250.0);
        assert_eq!(config.simulation.days, 90);
        assert_eq!(
            config.simulation.start_date,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(config.seed, Some(42));
        assert!((config.simulation.generator.avg_daily_bets - 3.0).abs() < 1e-12);
        assert!((config.goal.multiplier - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_start_date_anchors_to_today() {
        let file = write_config(r#"{ "simulation": { "days": 90 } }"#);

        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.simulation.start_date.is_none());

        let today = chrono::Utc::now().date_naive();
        let start = config.simulation.resolved_start_date().unwrap();
        assert_eq!(start, today - chrono::Duration::days(90));
    }

    #[test]
    fn test_custom_instruments() {
        let file = write_config(
            r#"{
                "benchmark": { "instruments": [
                    { "name": "Bonds", "annual_rate_pct": 4.5, "daily_volatility": 0.002 }
                ] }
            }"#,
        );

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.benchmark.instruments.len(), 1);
        assert_eq!(config.benchmark.instruments[0].name, "Bonds");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config(r#"{ "simulation": { "days": 0 } }"#);
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(SimError::ValidationError(_))
        ));

        let file = write_config(r#"{ "simulation": { "initial_bankroll": -5.0 } }"#);
        assert!(AppConfig::from_file(file.path()).is_err());

        let file = write_config(r#"{ "goal": { "multiplier": 1.0 } }"#);
        assert!(AppConfig::from_file(file.path()).is_err());

        let file = write_config(r#"{ "benchmark": { "instruments": [] } }"#);
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(SimError::ConfigError(_))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("{ not json");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(SimError::Json(_))
        ));

        assert!(matches!(
            AppConfig::from_file("/nonexistent/betsim.json"),
            Err(SimError::Io(_))
        ));
    }
}
