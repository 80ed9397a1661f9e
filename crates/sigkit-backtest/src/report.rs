//! Backtest report generation.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use sigkit_core::error::{SigkitError, SigkitResult};
use sigkit_core::types::TradeResult;

use crate::statistics::BacktestStats;

/// Complete backtest report for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub ticker: String,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub winrate: f64,
    /// Serialised as `"inf"` when there are gains and no losing trades
    #[serde(with = "infinite_f64")]
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub net_pnl: f64,
    pub equity_curve: Vec<f64>,
    pub trades: Vec<TradeResult>,
}

impl BacktestReport {
    pub fn new(ticker: impl Into<String>, stats: BacktestStats, trades: Vec<TradeResult>) -> Self {
        let net_pnl = stats.net_pnl();
        Self {
            ticker: ticker.into(),
            total_trades: stats.total_trades,
            wins: stats.winning_trades,
            losses: stats.losing_trades,
            winrate: stats.winrate,
            profit_factor: stats.profit_factor,
            max_drawdown: stats.max_drawdown,
            net_pnl,
            equity_curve: stats.equity_curve,
            trades,
        }
    }

    /// Report for a ticker that produced no trades.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self::new(ticker, BacktestStats::default(), Vec::new())
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str(&format!("  BACKTEST REPORT: {}\n", self.ticker));
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("TRADE STATISTICS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Total Trades:        {}\n", self.total_trades));
        s.push_str(&format!("  Winning Trades:      {}\n", self.wins));
        s.push_str(&format!("  Losing Trades:       {}\n", self.losses));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", self.winrate * 100.0));
        s.push_str(&format!(
            "  Profit Factor:       {}\n",
            format_profit_factor(self.profit_factor)
        ));
        s.push('\n');

        s.push_str("EQUITY\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Net PnL:             {:.4}\n", self.net_pnl));
        s.push_str(&format!("  Max Drawdown:        {:.4}\n", self.max_drawdown));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write `report_<TICKER>.json` into `dir` and return its path.
    pub fn save_json(&self, dir: &Path) -> SigkitResult<std::path::PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("report_{}.json", self.ticker));
        fs::write(&path, self.to_json()?)?;
        Ok(path)
    }

    /// Write the trade list as CSV.
    pub fn write_trades_csv<W: io::Write>(&self, writer: W) -> SigkitResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "ticker",
            "entry_time",
            "exit_time",
            "entry_price",
            "exit_price",
            "pnl",
            "status",
            "tp",
            "sl",
        ])
        .map_err(csv_error)?;

        for t in &self.trades {
            wtr.write_record([
                t.ticker.clone(),
                t.entry_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                t.exit_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                t.entry.to_string(),
                t.exit.to_string(),
                t.pnl.to_string(),
                t.status.to_string(),
                t.tp.to_string(),
                t.sl.to_string(),
            ])
            .map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Export to CSV (equity curve only).
    pub fn equity_to_csv(&self) -> String {
        let mut csv = String::from("trade,equity\n");
        for (i, equity) in self.equity_curve.iter().enumerate() {
            csv.push_str(&format!("{},{}\n", i + 1, equity));
        }
        csv
    }
}

fn csv_error(e: csv::Error) -> SigkitError {
    SigkitError::Serialization(e.to_string())
}

/// Human-readable profit factor.
pub fn format_profit_factor(pf: f64) -> String {
    if pf.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.2}", pf)
    }
}

/// Serde adapter writing infinite values as `"inf"` / `"-inf"`.
pub(crate) mod infinite_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => match s.to_lowercase().as_str() {
                "inf" | "infinity" => Ok(f64::INFINITY),
                "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
                other => Err(serde::de::Error::custom(format!("invalid number: {}", other))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use sigkit_core::types::SignalStatus;

    fn trade(pnl: f64) -> TradeResult {
        let t = DateTime::from_timestamp(1_704_067_200, 0).unwrap();
        TradeResult {
            ticker: "BBCA".into(),
            entry_time: t,
            exit_time: t,
            entry: 100.0,
            exit: 100.0 + pnl,
            pnl,
            status: SignalStatus::Tp,
            tp: 100.0 + pnl,
            sl: 95.0,
        }
    }

    #[test]
    fn test_infinite_profit_factor_json() {
        let trades = vec![trade(4.0)];
        let report = BacktestReport::new("BBCA", BacktestStats::from_trades(&trades), trades);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"profit_factor\": \"inf\""));

        let back: BacktestReport = serde_json::from_str(&json).unwrap();
        assert!(back.profit_factor.is_infinite());
        assert_eq!(back.trades, report.trades);
    }

    #[test]
    fn test_summary() {
        let report = BacktestReport::empty("BBCA");
        let summary = report.summary();

        assert!(summary.contains("BACKTEST REPORT: BBCA"));
        assert!(summary.contains("Total Trades:        0"));
        assert!(summary.contains("0.00%"));
    }

    #[test]
    fn test_save_json_and_trades_csv() {
        let dir = tempfile::tempdir().unwrap();
        let trades = vec![trade(4.0), trade(-2.0)];
        let report = BacktestReport::new("BBCA", BacktestStats::from_trades(&trades), trades);

        let path = report.save_json(dir.path()).unwrap();
        assert!(path.ends_with("report_BBCA.json"));

        let mut buf = Vec::new();
        report.write_trades_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text
            .starts_with("ticker,entry_time,exit_time,entry_price,exit_price,pnl,status,tp,sl\n"));
        assert!(text.contains("BBCA,2024-01-01T00:00:00Z,2024-01-01T00:00:00Z,100,104,4,TP"));
    }
}
