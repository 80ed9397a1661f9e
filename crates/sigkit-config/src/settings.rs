//! Configuration structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use sigkit_backtest::{BacktestConfig, EntryAlignment};
use sigkit_core::error::{SigkitError, SigkitResult};
use sigkit_notify::TelegramConfig;
use sigkit_risk::PositionSizer;
use sigkit_strategy::SignalParams;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub logging: LoggingConfig,
    pub paths: PathSettings,
    pub strategy: SignalParams,
    pub risk: RiskSettings,
    pub backtest: BacktestSettings,
    pub telegram: TelegramConfig,
    pub watcher: WatcherSettings,
    pub notify: NotifySettings,
}

impl AppConfig {
    /// Check values the loaders cannot express as types.
    pub fn validate(&self) -> SigkitResult<()> {
        self.strategy.validate()?;
        self.risk.validate()?;

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SigkitError::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        if self.watcher.interval_secs == 0 || self.notify.interval_secs == 0 {
            return Err(SigkitError::Config("interval_secs must be greater than 0".into()));
        }
        if !matches!(self.watcher.provider.as_str(), "csv" | "yahoo") {
            return Err(SigkitError::Config(format!(
                "watcher.provider must be 'csv' or 'yahoo', got '{}'",
                self.watcher.provider
            )));
        }
        Ok(())
    }

    pub fn backtest_config(&self) -> BacktestConfig {
        BacktestConfig {
            signal_params: self.strategy.clone(),
            entry_alignment: self.backtest.entry_alignment,
        }
    }
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "sigkit".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Folders for prices, signals and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub data_dir: PathBuf,
    pub signals_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub tuning_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            signals_dir: PathBuf::from("signals"),
            reports_dir: PathBuf::from("reports"),
            tuning_dir: PathBuf::from("tuning"),
        }
    }
}

/// Position sizing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Account balance used to size new signals
    pub balance: Decimal,
    pub risk_per_trade: Decimal,
    pub lot_size: u64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            balance: dec!(10000),
            risk_per_trade: dec!(0.01),
            lot_size: 1,
        }
    }
}

impl RiskSettings {
    pub fn validate(&self) -> SigkitResult<()> {
        if self.balance <= Decimal::ZERO {
            return Err(SigkitError::Config("risk.balance must be greater than 0".into()));
        }
        if self.risk_per_trade <= Decimal::ZERO || self.risk_per_trade > Decimal::ONE {
            return Err(SigkitError::Config("risk.risk_per_trade must be in (0, 1]".into()));
        }
        Ok(())
    }

    pub fn position_sizer(&self) -> PositionSizer {
        PositionSizer::new(self.risk_per_trade, self.lot_size)
    }
}

/// Backtest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BacktestSettings {
    pub entry_alignment: EntryAlignment,
}

/// Live watcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    pub interval_secs: u64,
    /// `csv` (last close of the local file) or `yahoo`
    pub provider: String,
    /// Tickers to poll; empty means every ticker with open signals
    pub tickers: Vec<String>,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            provider: "csv".to_string(),
            tickers: Vec::new(),
        }
    }
}

/// Notification loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub interval_secs: u64,
    /// Render messages without sending them
    pub test_mode: bool,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            test_mode: false,
        }
    }
}
