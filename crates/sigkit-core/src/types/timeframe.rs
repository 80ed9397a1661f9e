//! Bar intervals for price history requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Bar interval accepted by the chart providers.
///
/// The string form is the provider's interval code (`1d`, `1h`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// `(variant, provider code, accepted aliases)`
const CODES: &[(Timeframe, &str, &[&str])] = &[
    (Timeframe::Minute1, "1m", &["1min"]),
    (Timeframe::Minute5, "5m", &["5min"]),
    (Timeframe::Minute15, "15m", &["15min"]),
    (Timeframe::Minute30, "30m", &["30min"]),
    (Timeframe::Hour1, "1h", &["60m", "hour"]),
    (Timeframe::Daily, "1d", &["day", "daily"]),
    (Timeframe::Weekly, "1wk", &["1w", "weekly"]),
    (Timeframe::Monthly, "1mo", &["monthly"]),
];

impl Timeframe {
    pub fn code(&self) -> &'static str {
        CODES
            .iter()
            .find(|(tf, _, _)| tf == self)
            .map(|(_, code, _)| *code)
            .unwrap_or("1d")
    }

    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Timeframe::Minute1
                | Timeframe::Minute5
                | Timeframe::Minute15
                | Timeframe::Minute30
                | Timeframe::Hour1
        )
    }

    /// Longest history, in days, the chart endpoint serves at this interval.
    /// `None` for daily and coarser bars.
    pub fn max_history_days(&self) -> Option<i64> {
        match self {
            Timeframe::Minute1 => Some(7),
            Timeframe::Minute5 | Timeframe::Minute15 | Timeframe::Minute30 => Some(60),
            Timeframe::Hour1 => Some(730),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Timeframe {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        CODES
            .iter()
            .find(|(_, code, aliases)| *code == key || aliases.contains(&key.as_str()))
            .map(|(tf, _, _)| *tf)
            .ok_or_else(|| DataError::InvalidTimeframe(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = DataError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.code().to_string()
    }
}
