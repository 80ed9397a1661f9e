//! Engine-vs-backtest trade reconciliation.
//!
//! Trades from two sources are matched on `(ticker, entry_time)` and
//! compared on status and entry/exit prices.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use sigkit_core::error::{SigkitError, SigkitResult};
use sigkit_core::types::TradeResult;

/// Relative tolerance for price comparison.
const PRICE_TOLERANCE: f64 = 1e-6;

/// One trade as read from a trade list CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    pub ticker: String,
    pub entry_time: String,
    pub entry_price: Option<f64>,
    pub exit_time: Option<String>,
    pub exit_price: Option<f64>,
    pub status: String,
}

impl From<&TradeResult> for TradeRow {
    fn from(t: &TradeResult) -> Self {
        Self {
            ticker: t.ticker.clone(),
            entry_time: t.entry_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry_price: Some(t.entry),
            exit_time: Some(t.exit_time.to_rfc3339_opts(SecondsFormat::Secs, true)),
            exit_price: Some(t.exit),
            status: t.status.to_string(),
        }
    }
}

impl TradeRow {
    fn key(&self) -> String {
        format!("{}||{}", self.ticker, normalize_time(&self.entry_time))
    }

    fn is_win(&self) -> bool {
        matches!(self.status.as_str(), "TP" | "WIN")
    }
}

/// Per-ticker reconciliation counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub ticker: String,
    pub engine_count: usize,
    pub backtest_count: usize,
    pub matched: usize,
    pub mismatches: usize,
    pub wins_engine: usize,
    pub wins_backtest: usize,
}

/// A key present on one side only, or matched with differing fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub key: String,
    pub engine: Option<TradeRow>,
    pub backtest: Option<TradeRow>,
}

/// Canonical form of a timestamp string for matching.
fn normalize_time(s: &str) -> String {
    let s = s.trim();
    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.naive_utc().format(FORMAT).to_string();
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.format(FORMAT).to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return dt.format(FORMAT).to_string();
        }
    }
    s.to_string()
}

fn approx_equal(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => (a - b).abs() <= PRICE_TOLERANCE * 1.0_f64.max(a.abs()).max(b.abs()),
        _ => false,
    }
}

/// Compare two trade lists for one ticker.
pub fn compare_trades(
    ticker: &str,
    engine: &[TradeRow],
    backtest: &[TradeRow],
) -> (ReconcileSummary, Vec<Mismatch>) {
    let engine_map: BTreeMap<String, &TradeRow> = engine.iter().map(|t| (t.key(), t)).collect();
    let backtest_map: BTreeMap<String, &TradeRow> = backtest.iter().map(|t| (t.key(), t)).collect();

    let mut keys: Vec<&String> = engine_map.keys().chain(backtest_map.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut summary = ReconcileSummary {
        ticker: ticker.to_string(),
        engine_count: engine.len(),
        backtest_count: backtest.len(),
        ..Default::default()
    };
    let mut mismatches = Vec::new();

    for key in keys {
        let e = engine_map.get(key).copied();
        let b = backtest_map.get(key).copied();

        let differs = match (e, b) {
            (Some(e), Some(b)) => {
                summary.matched += 1;
                summary.wins_engine += usize::from(e.is_win());
                summary.wins_backtest += usize::from(b.is_win());
                e.status != b.status
                    || !approx_equal(e.entry_price, b.entry_price)
                    || !approx_equal(e.exit_price, b.exit_price)
            }
            _ => true,
        };

        if differs {
            debug!(%key, "Trade mismatch");
            mismatches.push(Mismatch {
                key: key.clone(),
                engine: e.cloned(),
                backtest: b.cloned(),
            });
        }
    }

    summary.mismatches = mismatches.len();
    (summary, mismatches)
}

fn parse_price(value: Option<&str>) -> Option<f64> {
    let v = value?.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("none") {
        return None;
    }
    v.parse().ok()
}

/// Read a trade list CSV.
///
/// Accepts `ticker|symbol`, `entry_time|timestamp`, `entry_price|entry|price`,
/// `exit_time|close_time`, `exit_price|exit|close_price` and `status` columns.
pub fn read_trades_csv(path: &Path) -> SigkitResult<Vec<TradeRow>> {
    let mut rdr =
        csv::Reader::from_path(path).map_err(|e| SigkitError::Serialization(e.to_string()))?;
    let headers = rdr
        .headers()
        .map_err(|e| SigkitError::Serialization(e.to_string()))?
        .clone();

    let find = |names: &[&str]| {
        names
            .iter()
            .find_map(|n| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(n)))
    };
    let ticker_idx = find(&["ticker", "symbol"]);
    let entry_time_idx = find(&["entry_time", "timestamp"]);
    let entry_price_idx = find(&["entry_price", "entry", "price"]);
    let exit_time_idx = find(&["exit_time", "close_time"]);
    let exit_price_idx = find(&["exit_price", "exit", "close_price"]);
    let status_idx = find(&["status"]);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| SigkitError::Serialization(e.to_string()))?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i));

        rows.push(TradeRow {
            ticker: field(ticker_idx).unwrap_or_default().trim().to_string(),
            entry_time: field(entry_time_idx).unwrap_or_default().trim().to_string(),
            entry_price: parse_price(field(entry_price_idx)),
            exit_time: field(exit_time_idx)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            exit_price: parse_price(field(exit_price_idx)),
            status: field(status_idx).unwrap_or_default().trim().to_uppercase(),
        });
    }

    Ok(rows)
}

/// Write `compare_<TICKER>.csv` listing both sides of every mismatch.
pub fn write_mismatch_report(
    dir: &Path,
    ticker: &str,
    mismatches: &[Mismatch],
) -> SigkitResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("compare_{}.csv", ticker));
    let mut wtr =
        csv::Writer::from_path(&path).map_err(|e| SigkitError::Serialization(e.to_string()))?;

    let header = [
        "key",
        "side",
        "ticker",
        "entry_time",
        "entry_price",
        "exit_time",
        "exit_price",
        "status",
    ];
    wtr.write_record(header)
        .map_err(|e| SigkitError::Serialization(e.to_string()))?;

    let fmt_price = |p: Option<f64>| p.map(|v| v.to_string()).unwrap_or_default();
    for m in mismatches {
        for (side, row) in [("engine", &m.engine), ("backtest", &m.backtest)] {
            let Some(row) = row else { continue };
            wtr.write_record([
                m.key.as_str(),
                side,
                row.ticker.as_str(),
                row.entry_time.as_str(),
                fmt_price(row.entry_price).as_str(),
                row.exit_time.as_deref().unwrap_or_default(),
                fmt_price(row.exit_price).as_str(),
                row.status.as_str(),
            ])
            .map_err(|e| SigkitError::Serialization(e.to_string()))?;
        }
    }

    wtr.flush()?;
    Ok(path)
}
