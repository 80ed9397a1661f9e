//! Grid sweep over independent backtests.

use chrono::Utc;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use sigkit_backtest::{BacktestConfig, BacktestEngine, BacktestStats};
use sigkit_core::error::TunerError;
use sigkit_core::types::PriceSeries;

use crate::grid::{apply_params, ParamGrid, ParamSet};
use crate::walk_forward::WalkForward;

/// Aggregated score of one parameter combination.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningRow {
    pub params: ParamSet,
    /// Folds scored (1 for a full-history run)
    pub folds: usize,
    pub avg_winrate: f64,
    /// Mean over finite fold values; infinite only if every fold was
    pub avg_profit_factor: f64,
    pub total_trades: usize,
    pub avg_max_drawdown: f64,
}

/// Fold statistics reduced to a single row.
///
/// Infinite profit factors are left out of the mean. If every fold had
/// an infinite profit factor the mean is infinite; with no folds it is 0.
pub fn aggregate(params: ParamSet, stats: &[BacktestStats]) -> TuningRow {
    let folds = stats.len();
    let mean = |values: Vec<f64>| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };

    let finite_pf: Vec<f64> = stats
        .iter()
        .map(|s| s.profit_factor)
        .filter(|pf| pf.is_finite())
        .collect();
    let avg_profit_factor = if finite_pf.is_empty() && folds > 0 {
        f64::INFINITY
    } else {
        mean(finite_pf)
    };

    TuningRow {
        params,
        folds,
        avg_winrate: mean(stats.iter().map(|s| s.winrate).collect()),
        avg_profit_factor,
        total_trades: stats.iter().map(|s| s.total_trades).sum(),
        avg_max_drawdown: mean(stats.iter().map(|s| s.max_drawdown).collect()),
    }
}

/// Evaluates every grid combination against one series.
#[derive(Debug, Clone)]
pub struct Tuner {
    base: BacktestConfig,
    walk_forward: Option<WalkForward>,
    parallel: bool,
}

impl Tuner {
    pub fn new(base: BacktestConfig) -> Self {
        Self {
            base,
            walk_forward: None,
            parallel: true,
        }
    }

    /// Score with walk-forward folds instead of one full-history run.
    pub fn with_walk_forward(mut self, walk_forward: WalkForward) -> Self {
        self.walk_forward = Some(walk_forward);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn evaluate(&self, series: &PriceSeries, set: &ParamSet) -> Result<TuningRow, TunerError> {
        let mut config = self.base.clone();
        config.signal_params = apply_params(&self.base.signal_params, set)?;
        let engine = BacktestEngine::new(config)?;

        let stats = match &self.walk_forward {
            Some(wf) => wf
                .evaluate(&engine, series)
                .into_iter()
                .map(|(_, stats)| stats)
                .collect(),
            None => vec![BacktestStats::from_trades(&engine.run(series).trades)],
        };
        Ok(aggregate(set.clone(), &stats))
    }

    /// One row per combination, in grid order.
    pub fn run(
        &self,
        series: &PriceSeries,
        grid: &ParamGrid,
    ) -> Result<Vec<TuningRow>, TunerError> {
        let combos = grid.combinations();
        info!(
            symbol = %series.symbol,
            combinations = combos.len(),
            walk_forward_days = self.walk_forward.as_ref().map(|w| w.window.num_days()),
            "Starting parameter sweep"
        );

        let rows = if self.parallel {
            combos
                .par_iter()
                .map(|set| self.evaluate(series, set))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            combos
                .iter()
                .map(|set| self.evaluate(series, set))
                .collect::<Result<Vec<_>, _>>()?
        };

        info!(symbol = %series.symbol, rows = rows.len(), "Parameter sweep complete");
        Ok(rows)
    }
}

/// Write rows to `<dir>/tuning_<TICKER>_<UTC timestamp>.csv`.
///
/// Columns are the grid's parameter names followed by the aggregate
/// metrics; infinite values are written as `inf`.
pub fn export_csv(dir: &Path, ticker: &str, rows: &[TuningRow]) -> Result<PathBuf, TunerError> {
    fs::create_dir_all(dir)?;
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let path = dir.join(format!("tuning_{}_{}.csv", ticker, stamp));

    let names: Vec<String> = rows
        .first()
        .map(|r| r.params.keys().cloned().collect())
        .unwrap_or_default();

    let export = |e: csv::Error| TunerError::Export(e.to_string());
    let mut wtr = csv::Writer::from_path(&path).map_err(export)?;

    let mut header = names.clone();
    header.extend(
        ["folds", "avg_winrate", "avg_profit_factor", "total_trades", "avg_max_drawdown"]
            .iter()
            .map(|s| s.to_string()),
    );
    wtr.write_record(&header).map_err(export)?;

    for row in rows {
        let mut record: Vec<String> = names
            .iter()
            .map(|n| row.params.get(n).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        record.push(row.folds.to_string());
        record.push(row.avg_winrate.to_string());
        record.push(row.avg_profit_factor.to_string());
        record.push(row.total_trades.to_string());
        record.push(row.avg_max_drawdown.to_string());
        wtr.write_record(&record).map_err(export)?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Tuning results saved");
    Ok(path)
}
