//! Engine configuration: fixed at construction, validated once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default fraction of available cash committed per buy.
pub const DEFAULT_POSITION_SIZE: f64 = 0.95;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial capital must be finite and > 0, got {0}")]
    NonPositiveCapital(f64),
    #[error("commission rate must be finite and >= 0, got {0}")]
    NegativeCommission(f64),
    #[error("position size must be in (0, 1], got {0}")]
    InvalidPositionSize(f64),
    #[error("periods per year must be finite and > 0, got {0}")]
    InvalidPeriodsPerYear(f64),
    #[error("risk-free rate must be finite, got {0}")]
    InvalidRiskFreeRate(f64),
}

/// Which legs of a round trip pay commission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionLegs {
    #[default]
    Both,
    EntryOnly,
    ExitOnly,
}

impl CommissionLegs {
    pub fn charges_entry(self) -> bool {
        matches!(self, CommissionLegs::Both | CommissionLegs::EntryOnly)
    }

    pub fn charges_exit(self) -> bool {
        matches!(self, CommissionLegs::Both | CommissionLegs::ExitOnly)
    }
}

/// Configuration for a single backtest run.
///
/// Fields are private so that every instance has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    initial_capital: f64,
    /// Fraction of fill notional charged per leg.
    commission_rate: f64,
    /// Fraction of available cash committed per buy.
    position_size: f64,
    commission_legs: CommissionLegs,
}

impl EngineConfig {
    /// Create a config with the default 95% position size and commission on both legs.
    pub fn new(initial_capital: f64, commission_rate: f64) -> Result<Self, ConfigError> {
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(initial_capital));
        }
        if !commission_rate.is_finite() || commission_rate < 0.0 {
            return Err(ConfigError::NegativeCommission(commission_rate));
        }
        Ok(Self {
            initial_capital,
            commission_rate,
            position_size: DEFAULT_POSITION_SIZE,
            commission_legs: CommissionLegs::Both,
        })
    }

    pub fn with_position_size(mut self, position_size: f64) -> Result<Self, ConfigError> {
        if !(position_size > 0.0 && position_size <= 1.0) {
            return Err(ConfigError::InvalidPositionSize(position_size));
        }
        self.position_size = position_size;
        Ok(self)
    }

    pub fn with_commission_legs(mut self, legs: CommissionLegs) -> Self {
        self.commission_legs = legs;
        self
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    pub fn position_size(&self) -> f64 {
        self.position_size
    }

    pub fn commission_legs(&self) -> CommissionLegs {
        self.commission_legs
    }

    pub(crate) fn entry_rate(&self) -> f64 {
        if self.commission_legs.charges_entry() {
            self.commission_rate
        } else {
            0.0
        }
    }

    pub(crate) fn exit_rate(&self) -> f64 {
        if self.commission_legs.charges_exit() {
            self.commission_rate
        } else {
            0.0
        }
    }
}
