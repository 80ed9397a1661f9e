//! Error types for the signal toolkit.

use thiserror::Error;

/// Top-level toolkit error.
#[derive(Error, Debug)]
pub enum SigkitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Risk error: {0}")]
    Risk(#[from] RiskError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Tuning error: {0}")]
    Tuner(#[from] TunerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Price data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Price series is empty")]
    Empty,

    #[error("Duplicate timestamp {timestamp} at row {index}")]
    DuplicateTimestamp { index: usize, timestamp: i64 },

    #[error("Timestamps not ascending at row {index}")]
    Unordered { index: usize },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("No price data for {0}")]
    NotFound(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Input series is empty")]
    EmptyInput,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing indicator columns: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("Column length mismatch: {column} has {actual} rows, frame has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Signal generation errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

/// Risk engine input errors.
#[derive(Error, Debug, PartialEq)]
pub enum RiskError {
    #[error("Entry price must be > 0, got {0}")]
    InvalidEntry(f64),

    #[error("ATR must be provided and > 0 in atr mode")]
    MissingAtr,

    #[error("Unknown risk mode '{0}'")]
    UnknownMode(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Signal persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Notification transport errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),
}

/// Parameter grid and sweep errors.
#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Unknown tunable parameter '{0}'")]
    UnknownParameter(String),

    #[error("Invalid value {value} for '{name}'")]
    InvalidValue { name: String, value: f64 },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SigkitError {
    fn from(err: serde_json::Error) -> Self {
        SigkitError::Serialization(err.to_string())
    }
}

/// Result type alias for toolkit operations.
pub type SigkitResult<T> = Result<T, SigkitError>;
