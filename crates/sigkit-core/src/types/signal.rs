//! Trading signals and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signal direction. Only long entries are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[default]
    Buy,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
        }
    }
}

/// Lifecycle status of a signal.
///
/// A signal starts `Open` and moves exactly once to one of the terminal
/// states. Terminal states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStatus {
    #[default]
    Open,
    /// Take-profit reached
    Tp,
    /// Stop-loss reached
    Sl,
    /// Closed at the end of available data
    End,
}

impl SignalStatus {
    /// Check if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SignalStatus::Open)
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalStatus::Open => "OPEN",
            SignalStatus::Tp => "TP",
            SignalStatus::Sl => "SL",
            SignalStatus::End => "END",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SignalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Ok(SignalStatus::Open),
            "TP" => Ok(SignalStatus::Tp),
            "SL" => Ok(SignalStatus::Sl),
            "END" => Ok(SignalStatus::End),
            other => Err(format!("Invalid signal status: {}", other)),
        }
    }
}

/// Fields supplied when a signal is first created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSignal {
    pub ticker: String,
    /// Entry time
    pub timestamp: DateTime<Utc>,
    pub entry: f64,
    pub tp: f64,
    pub sl: f64,
    pub strategy_version: String,
}

/// A BUY signal with its take-profit / stop-loss levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Unique identifier
    pub id: String,
    pub ticker: String,
    /// Entry time
    pub timestamp: DateTime<Utc>,
    /// Entry price
    pub entry: f64,
    /// Take-profit price
    pub tp: f64,
    /// Stop-loss price
    pub sl: f64,
    pub side: Side,
    pub strategy_version: String,
    pub status: SignalStatus,
    /// Set once the notification collaborator delivered the signal
    #[serde(default)]
    pub notified: bool,
    /// Free-form note recorded with the terminal transition
    #[serde(default)]
    pub status_info: Option<String>,
}

impl Signal {
    /// Create an open, un-notified signal.
    pub fn open(id: impl Into<String>, new: NewSignal) -> Self {
        Self {
            id: id.into(),
            ticker: new.ticker,
            timestamp: new.timestamp,
            entry: new.entry,
            tp: new.tp,
            sl: new.sl,
            side: Side::Buy,
            strategy_version: new.strategy_version,
            status: SignalStatus::Open,
            notified: false,
            status_info: None,
        }
    }

    /// Fields needed to persist this signal under a fresh id.
    pub fn to_new(&self) -> NewSignal {
        NewSignal {
            ticker: self.ticker.clone(),
            timestamp: self.timestamp,
            entry: self.entry,
            tp: self.tp,
            sl: self.sl,
            strategy_version: self.strategy_version.clone(),
        }
    }

    /// Entry time as Unix milliseconds, comparable with `Bar::timestamp`.
    pub fn entry_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Compare-and-set transition from `Open` to a terminal status.
    ///
    /// Returns `false` (and leaves the signal untouched) if the signal is
    /// already terminal or `status` is `Open`.
    pub fn close(&mut self, status: SignalStatus, info: Option<String>) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.status_info = info;
        true
    }
}

/// Selection criteria for listing stored signals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalFilter {
    pub ticker: Option<String>,
    pub status: Option<SignalStatus>,
    pub notified: Option<bool>,
}

impl SignalFilter {
    /// Match all signals of one ticker.
    pub fn ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker: Some(ticker.into()),
            ..Default::default()
        }
    }

    /// Match all signals with the given status.
    pub fn status(status: SignalStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Open signals that have not been delivered yet.
    pub fn pending_notification() -> Self {
        Self {
            status: Some(SignalStatus::Open),
            notified: Some(false),
            ..Default::default()
        }
    }

    /// Restrict to a ticker.
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn matches(&self, signal: &Signal) -> bool {
        self.ticker.as_ref().map_or(true, |t| *t == signal.ticker)
            && self.status.map_or(true, |s| s == signal.status)
            && self.notified.map_or(true, |n| n == signal.notified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Signal {
        Signal::open(
            "S-1",
            NewSignal {
                ticker: "BBCA".to_string(),
                timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                entry: 100.0,
                tp: 104.0,
                sl: 98.0,
                strategy_version: "v1-strict".to_string(),
            },
        )
    }

    #[test]
    fn test_close_is_first_match_wins() {
        let mut signal = sample();
        assert!(signal.close(SignalStatus::Tp, Some("hit".into())));
        assert!(!signal.close(SignalStatus::Sl, None));
        assert_eq!(signal.status, SignalStatus::Tp);
        assert_eq!(signal.status_info.as_deref(), Some("hit"));
    }

    #[test]
    fn test_close_rejects_open_target() {
        let mut signal = sample();
        assert!(!signal.close(SignalStatus::Open, None));
        assert_eq!(signal.status, SignalStatus::Open);
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("tp".parse::<SignalStatus>().unwrap(), SignalStatus::Tp);
        assert_eq!(SignalStatus::End.to_string(), "END");
        assert!("WIN".parse::<SignalStatus>().is_err());
    }

    #[test]
    fn test_filter_matching() {
        let signal = sample();
        assert!(SignalFilter::ticker("BBCA").matches(&signal));
        assert!(!SignalFilter::ticker("TLKM").matches(&signal));
        assert!(SignalFilter::pending_notification().matches(&signal));
        assert!(!SignalFilter::status(SignalStatus::Sl).matches(&signal));
    }
}
