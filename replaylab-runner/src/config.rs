//! Serializable backtest configuration.
//!
//! A run is described by a TOML document with three optional parts:
//!
//! ```toml
//! [engine]
//! initial_capital = 10000.0
//! commission_rate = 0.001
//!
//! [metrics]
//! periods_per_year = 252.0
//!
//! [[strategies]]
//! type = "sma_crossover"
//! short = 20
//! long = 50
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use replaylab_core::engine::{CommissionLegs, ConfigError, EngineConfig, DEFAULT_POSITION_SIZE};
use replaylab_core::metrics::{MetricsConfig, DEFAULT_PERIODS_PER_YEAR};
use replaylab_core::strategy::{
    BollingerReversion, BuyAndHold, EmaCrossover, MacdCrossover, MultiIndicator, RsiReversal,
    SmaCrossover, StochasticCross, Strategy, StrategyError,
};

/// Unique identifier for a configuration (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
    #[error("invalid strategy parameters: {0}")]
    InvalidStrategy(#[from] StrategyError),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level configuration for a backtest or a strategy comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestConfig {
    /// Run comparison entries on the rayon pool.
    pub parallel: bool,
    pub engine: EngineSection,
    pub metrics: MetricsSection,
    /// Strategies to compare. Empty means [`StrategyConfig::default_presets`].
    pub strategies: Vec<StrategyConfig>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            engine: EngineSection::default(),
            metrics: MetricsSection::default(),
            strategies: Vec::new(),
        }
    }
}

impl BacktestConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    ///
    /// Engine and metrics settings are checked here; strategy parameters are
    /// checked when each strategy is built.
    pub fn from_toml(content: &str) -> Result<Self, ConfigFileError> {
        let config: Self = toml::from_str(content)?;
        config.engine_config()?;
        config.metrics_config()?;
        Ok(config)
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigFileError> {
        let config = EngineConfig::new(self.engine.initial_capital, self.engine.commission_rate)?
            .with_position_size(self.engine.position_size)?
            .with_commission_legs(self.engine.commission_legs);
        Ok(config)
    }

    pub fn metrics_config(&self) -> Result<MetricsConfig, ConfigFileError> {
        Ok(MetricsConfig::new(
            self.metrics.periods_per_year,
            self.metrics.risk_free_rate,
        )?)
    }

    /// The configured strategies, or the default preset list when none are given.
    pub fn strategy_list(&self) -> Vec<StrategyConfig> {
        if self.strategies.is_empty() {
            StrategyConfig::default_presets()
        } else {
            self.strategies.clone()
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two identical configurations share a RunId, so results can be
    /// matched to the settings that produced them.
    pub fn run_id(&self) -> Result<RunId, ConfigFileError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// `[engine]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub position_size: f64,
    pub commission_legs: CommissionLegs,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            commission_rate: 0.001,
            position_size: DEFAULT_POSITION_SIZE,
            commission_legs: CommissionLegs::Both,
        }
    }
}

/// `[metrics]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsSection {
    pub periods_per_year: f64,
    /// Annual, as a fraction.
    pub risk_free_rate: f64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            risk_free_rate: 0.0,
        }
    }
}

/// One reference strategy and its parameters (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    BuyAndHold,

    SmaCrossover {
        #[serde(default = "defaults::sma_short")]
        short: usize,
        #[serde(default = "defaults::sma_long")]
        long: usize,
    },

    EmaCrossover {
        #[serde(default = "defaults::ema_short")]
        short: usize,
        #[serde(default = "defaults::ema_long")]
        long: usize,
    },

    RsiReversal {
        #[serde(default = "defaults::rsi_period")]
        period: usize,
        #[serde(default = "defaults::rsi_oversold")]
        oversold: f64,
        #[serde(default = "defaults::rsi_overbought")]
        overbought: f64,
    },

    BollingerReversion {
        #[serde(default = "defaults::bollinger_period")]
        period: usize,
        #[serde(default = "defaults::bollinger_std_dev")]
        std_dev: f64,
    },

    MacdCrossover {
        #[serde(default = "defaults::macd_fast")]
        fast: usize,
        #[serde(default = "defaults::macd_slow")]
        slow: usize,
        #[serde(default = "defaults::macd_signal")]
        signal: usize,
    },

    StochasticCross {
        #[serde(default = "defaults::stochastic_k")]
        k_period: usize,
        #[serde(default = "defaults::stochastic_d")]
        d_period: usize,
        #[serde(default = "defaults::stochastic_overbought")]
        overbought: f64,
        #[serde(default = "defaults::stochastic_oversold")]
        oversold: f64,
    },

    MultiIndicator,
}

impl StrategyConfig {
    /// Build the strategy, validating its parameters.
    pub fn build(&self) -> Result<Box<dyn Strategy>, ConfigFileError> {
        let strategy: Box<dyn Strategy> = match *self {
            StrategyConfig::BuyAndHold => Box::new(BuyAndHold),
            StrategyConfig::SmaCrossover { short, long } => {
                Box::new(SmaCrossover::new(short, long)?)
            }
            StrategyConfig::EmaCrossover { short, long } => {
                Box::new(EmaCrossover::new(short, long)?)
            }
            StrategyConfig::RsiReversal {
                period,
                oversold,
                overbought,
            } => Box::new(RsiReversal::new(period, oversold, overbought)?),
            StrategyConfig::BollingerReversion { period, std_dev } => {
                Box::new(BollingerReversion::new(period, std_dev)?)
            }
            StrategyConfig::MacdCrossover { fast, slow, signal } => {
                Box::new(MacdCrossover::new(fast, slow, signal)?)
            }
            StrategyConfig::StochasticCross {
                k_period,
                d_period,
                overbought,
                oversold,
            } => Box::new(StochasticCross::new(
                k_period, d_period, overbought, oversold,
            )?),
            StrategyConfig::MultiIndicator => Box::new(MultiIndicator),
        };
        Ok(strategy)
    }

    /// The comparison set used when no strategies are configured:
    /// SMA crossover, RSI reversal, Bollinger reversion, buy-and-hold.
    pub fn default_presets() -> Vec<StrategyConfig> {
        vec![
            StrategyConfig::SmaCrossover {
                short: defaults::sma_short(),
                long: defaults::sma_long(),
            },
            StrategyConfig::RsiReversal {
                period: defaults::rsi_period(),
                oversold: defaults::rsi_oversold(),
                overbought: defaults::rsi_overbought(),
            },
            StrategyConfig::BollingerReversion {
                period: defaults::bollinger_period(),
                std_dev: defaults::bollinger_std_dev(),
            },
            StrategyConfig::BuyAndHold,
        ]
    }
}

mod defaults {
    pub fn sma_short() -> usize {
        20
    }
    pub fn sma_long() -> usize {
        50
    }
    pub fn ema_short() -> usize {
        9
    }
    pub fn ema_long() -> usize {
        21
    }
    pub fn rsi_period() -> usize {
        14
    }
    pub fn rsi_oversold() -> f64 {
        30.0
    }
    pub fn rsi_overbought() -> f64 {
        70.0
    }
    pub fn bollinger_period() -> usize {
        20
    }
    pub fn bollinger_std_dev() -> f64 {
        2.0
    }
    pub fn macd_fast() -> usize {
        12
    }
    pub fn macd_slow() -> usize {
        26
    }
    pub fn macd_signal() -> usize {
        9
    }
    pub fn stochastic_k() -> usize {
        14
    }
    pub fn stochastic_d() -> usize {
        3
    }
    pub fn stochastic_overbought() -> f64 {
        80.0
    }
    pub fn stochastic_oversold() -> f64 {
        20.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = BacktestConfig::from_toml("").unwrap();
        assert_eq!(config, BacktestConfig::default());

        let engine = config.engine_config().unwrap();
        assert_eq!(engine.initial_capital(), 10_000.0);
        assert_eq!(engine.commission_rate(), 0.001);
        assert_eq!(engine.position_size(), 0.95);
        assert_eq!(config.metrics_config().unwrap().periods_per_year(), 252.0);
        assert_eq!(config.strategy_list().len(), 4);
    }

    #[test]
    fn parses_full_document() {
        let toml = r#"
            parallel = false

            [engine]
            initial_capital = 50000.0
            commission_rate = 0.0005
            position_size = 0.5
            commission_legs = "exit_only"

            [metrics]
            periods_per_year = 52.0
            risk_free_rate = 0.02

            [[strategies]]
            type = "sma_crossover"
            short = 10
            long = 30

            [[strategies]]
            type = "buy_and_hold"

            [[strategies]]
            type = "rsi_reversal"
        "#;
        let config = BacktestConfig::from_toml(toml).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.engine.commission_legs, CommissionLegs::ExitOnly);
        assert_eq!(config.metrics.risk_free_rate, 0.02);
        assert_eq!(
            config.strategies,
            vec![
                StrategyConfig::SmaCrossover { short: 10, long: 30 },
                StrategyConfig::BuyAndHold,
                StrategyConfig::RsiReversal {
                    period: 14,
                    oversold: 30.0,
                    overbought: 70.0,
                },
            ]
        );
    }

    #[test]
    fn rejects_invalid_engine_values() {
        let err = BacktestConfig::from_toml("[engine]\ninitial_capital = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::Invalid(ConfigError::NonPositiveCapital(_))
        ));

        let err = BacktestConfig::from_toml("[engine]\nposition_size = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::Invalid(ConfigError::InvalidPositionSize(_))
        ));

        let err = BacktestConfig::from_toml("[metrics]\nperiods_per_year = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::Invalid(ConfigError::InvalidPeriodsPerYear(_))
        ));

        for rate in ["nan", "inf", "-inf"] {
            let err = BacktestConfig::from_toml(&format!("[metrics]\nrisk_free_rate = {rate}"))
                .unwrap_err();
            assert!(
                matches!(err, ConfigFileError::Invalid(ConfigError::InvalidRiskFreeRate(_))),
                "risk_free_rate = {rate}"
            );
        }
    }

    #[test]
    fn rejects_unknown_keys_and_types() {
        assert!(matches!(
            BacktestConfig::from_toml("[engine]\ncapital = 5.0"),
            Err(ConfigFileError::Parse(_))
        ));
        assert!(matches!(
            BacktestConfig::from_toml("[[strategies]]\ntype = \"martingale\""),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn build_validates_parameters() {
        let bad = StrategyConfig::SmaCrossover { short: 50, long: 20 };
        assert!(matches!(
            bad.build(),
            Err(ConfigFileError::InvalidStrategy(_))
        ));

        for preset in StrategyConfig::default_presets() {
            assert!(preset.build().is_ok(), "{preset:?}");
        }
        let built = StrategyConfig::MultiIndicator.build().unwrap();
        assert_eq!(built.name(), "multi_indicator");
    }

    #[test]
    fn run_id_deterministic() {
        let a = BacktestConfig::default();
        let b = BacktestConfig::default();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let a = BacktestConfig::default();
        let mut b = BacktestConfig::default();
        b.engine.commission_rate = 0.002;
        assert_ne!(a.run_id().unwrap(), b.run_id().unwrap());
    }

    #[test]
    fn config_serialization_roundtrip() {
        let mut config = BacktestConfig::default();
        config.strategies = StrategyConfig::default_presets();
        let toml = toml::to_string(&config).unwrap();
        let back = BacktestConfig::from_toml(&toml).unwrap();
        assert_eq!(config, back);
    }
}
