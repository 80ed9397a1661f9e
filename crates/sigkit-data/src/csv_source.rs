//! CSV price history files.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use sigkit_core::error::DataError;
use sigkit_core::types::{Bar, PriceSeries};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Datetime",
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp"
    )]
    datetime: String,
    #[serde(alias = "Open", alias = "open")]
    open: Option<f64>,
    #[serde(alias = "High", alias = "high")]
    high: Option<f64>,
    #[serde(alias = "Low", alias = "low")]
    low: Option<f64>,
    #[serde(alias = "Close", alias = "close")]
    close: Option<f64>,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: Option<f64>,
}

const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse the timestamp formats found in price files (Unix ms).
pub fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let s = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    // yfinance style, e.g. 2024-01-02 09:00:00+07:00
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    // Try parsing as Unix timestamp
    if let Ok(ts) = s.parse::<i64>() {
        // Assume milliseconds if > 10 digits
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!("Could not parse date: {}", date_str)))
}

/// Load a price CSV into a validated series.
///
/// Rows that fail to parse or miss any of open/high/low/close are skipped
/// with a warning instead of failing the file. Rows are sorted
/// ascending before validation, so duplicates surface as
/// `DataError::DuplicateTimestamp`.
pub fn load_price_csv(path: &Path, symbol: &str) -> Result<PriceSeries, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(path.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(e.to_string()))?
        .clone();
    if !headers.iter().any(|h| h.eq_ignore_ascii_case("close")) {
        return Err(DataError::MissingColumn("Close".into()));
    }

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize() {
        let record: CsvRecord = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(symbol, error = %e, "Unreadable price row");
                skipped += 1;
                continue;
            }
        };
        let timestamp = match parse_timestamp(&record.datetime) {
            Ok(ts) => ts,
            Err(e) => {
                debug!(symbol, error = %e, "Unparseable timestamp");
                skipped += 1;
                continue;
            }
        };

        match (record.open, record.high, record.low, record.close) {
            (Some(open), Some(high), Some(low), Some(close)) => {
                let bar = Bar::new(timestamp, open, high, low, close, record.volume.unwrap_or(0.0));
                if bar.is_finite() {
                    bars.push(bar);
                } else {
                    skipped += 1;
                }
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(symbol, skipped, "Skipped malformed or incomplete price rows");
    }

    bars.sort_by_key(|b| b.timestamp);
    debug!(symbol, bars = bars.len(), path = %path.display(), "Loaded price history");
    PriceSeries::new(symbol, bars)
}

/// Write bars as `Datetime,Open,High,Low,Close,Volume`.
pub fn write_price_csv(path: &Path, bars: &[Bar]) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::Writer::from_path(path).map_err(|e| DataError::ParseError(e.to_string()))?;
    wtr.write_record(["Datetime", "Open", "High", "Low", "Close", "Volume"])
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    for bar in bars {
        wtr.write_record([
            bar.datetime().format(WRITE_FORMAT).to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])
        .map_err(|e| DataError::ParseError(e.to_string()))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Merge two bar sets by timestamp; bars from `newer` replace `existing`.
pub fn merge_bars(existing: &[Bar], newer: &[Bar]) -> Vec<Bar> {
    let mut by_ts: BTreeMap<i64, Bar> = existing.iter().map(|b| (b.timestamp, *b)).collect();
    for bar in newer {
        by_ts.insert(bar.timestamp, *bar);
    }
    by_ts.into_values().collect()
}

/// Persist fetched bars, merging with the existing file unless `force`.
pub fn save_bars(
    path: &Path,
    symbol: &str,
    fetched: &[Bar],
    force: bool,
) -> Result<PriceSeries, DataError> {
    let bars = if !force && path.exists() {
        let existing = load_price_csv(path, symbol)?;
        merge_bars(existing.bars(), fetched)
    } else {
        merge_bars(&[], fetched)
    };

    let series = PriceSeries::new(symbol, bars)?;
    write_price_csv(path, series.bars())?;
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400_000;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), 1_705_276_800_000);
        assert_eq!(parse_timestamp("2024-01-15 00:00:00").unwrap(), 1_705_276_800_000);
        assert_eq!(parse_timestamp("2024-01-15T07:00:00+07:00").unwrap(), 1_705_276_800_000);
        assert_eq!(parse_timestamp("2024-01-15 07:00:00+07:00").unwrap(), 1_705_276_800_000);
        assert!(parse_timestamp("1705312800000").is_ok()); // Unix ms
        assert!(parse_timestamp("1705312800").is_ok()); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_sorts_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BBCA.csv");
        fs::write(
            &path,
            "Datetime,Open,High,Low,Close,Volume\n\
             2024-01-03,11,12,10,11.5,100\n\
             2024-01-02,10,11,9,10.5,100\n\
             2024-01-04,,,,,\n",
        )
        .unwrap();

        let series = load_price_csv(&path, "BBCA").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.5, 11.5]);
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let header = "Datetime,Open,High,Low,Close,Volume\n";
        let cases = [
            ("BAD_PRICE.csv", "2024-01-03,11,12,10,n/a,100\n"),
            ("BAD_DATE.csv", "garbage,11,12,10,11.5,100\n"),
        ];

        for (name, bad_row) in cases {
            let path = dir.path().join(name);
            let body = format!(
                "{header}2024-01-02,10,11,9,10.5,100\n{bad_row}2024-01-04,12,13,11,12.5,100\n"
            );
            fs::write(&path, body).unwrap();

            let series = load_price_csv(&path, "BBCA").unwrap();
            assert_eq!(series.len(), 2, "{name}");
            assert_eq!(series.closes(), vec![10.5, 12.5]);
        }
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DUP.csv");
        fs::write(
            &path,
            "Datetime,Open,High,Low,Close,Volume\n\
             2024-01-02,10,11,9,10.5,100\n\
             2024-01-02,10,11,9,10.6,100\n",
        )
        .unwrap();

        assert!(matches!(
            load_price_csv(&path, "DUP"),
            Err(DataError::DuplicateTimestamp { .. })
        ));
    }

    #[test]
    fn test_missing_file_and_column() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_price_csv(&dir.path().join("NONE.csv"), "NONE"),
            Err(DataError::NotFound(_))
        ));

        let path = dir.path().join("BAD.csv");
        fs::write(&path, "Datetime,Open\n2024-01-02,10\n").unwrap();
        assert!(matches!(load_price_csv(&path, "BAD"), Err(DataError::MissingColumn(_))));
    }

    #[test]
    fn test_merge_prefers_newer() {
        let old = vec![Bar::flat(0, 1.0), Bar::flat(DAY, 2.0)];
        let new = vec![Bar::flat(DAY, 2.5), Bar::flat(2 * DAY, 3.0)];

        let merged = merge_bars(&old, &new);
        let closes: Vec<f64> = merged.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn test_save_bars_merge_and_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T.csv");

        save_bars(&path, "T", &[Bar::flat(0, 1.0), Bar::flat(DAY, 2.0)], false).unwrap();
        let merged = save_bars(&path, "T", &[Bar::flat(2 * DAY, 3.0)], false).unwrap();
        assert_eq!(merged.len(), 3);

        let reloaded = load_price_csv(&path, "T").unwrap();
        assert_eq!(reloaded, merged);

        let forced = save_bars(&path, "T", &[Bar::flat(5 * DAY, 9.0)], true).unwrap();
        assert_eq!(forced.len(), 1);
    }
}
