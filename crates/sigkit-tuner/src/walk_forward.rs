//! Walk-forward folds.
//!
//! History is cut into consecutive validation windows of fixed length.
//! Fold `k` generates signals on every bar up to the end of its window
//! (an expanding prefix), replays them on that same prefix, and keeps
//! only trades entered inside the window.

use chrono::Duration;
use tracing::debug;

use sigkit_backtest::{BacktestEngine, BacktestStats};
use sigkit_core::types::PriceSeries;

/// One validation window over a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub index: usize,
    /// Bars strictly before the window
    pub train_bars: usize,
    /// Bars inside the window
    pub validation_bars: usize,
    /// Window start (Unix ms, inclusive)
    pub start: i64,
    /// Window end (Unix ms, exclusive)
    pub end: i64,
}

impl Fold {
    /// Length of the prefix the fold trains and replays on.
    pub fn prefix_len(&self) -> usize {
        self.train_bars + self.validation_bars
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

/// Walk-forward fold policy.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkForward {
    pub window: Duration,
    pub min_train_bars: usize,
    pub min_validation_bars: usize,
}

impl WalkForward {
    pub fn days(days: i64) -> Self {
        Self {
            window: Duration::days(days),
            min_train_bars: 10,
            min_validation_bars: 2,
        }
    }

    /// Folds with enough training and validation bars.
    pub fn folds(&self, series: &PriceSeries) -> Vec<Fold> {
        let window_ms = self.window.num_milliseconds();
        let (Some(first), Some(last)) = (series.bars().first(), series.last()) else {
            return Vec::new();
        };
        if window_ms <= 0 {
            return Vec::new();
        }

        let mut folds = Vec::new();
        let mut start = first.timestamp + window_ms;
        while start <= last.timestamp {
            let end = start + window_ms;
            let train_bars = series.count_before(start);
            let validation_bars = series.count_before(end) - train_bars;

            if train_bars >= self.min_train_bars && validation_bars >= self.min_validation_bars {
                folds.push(Fold {
                    index: folds.len(),
                    train_bars,
                    validation_bars,
                    start,
                    end,
                });
            } else {
                debug!(start, train_bars, validation_bars, "Skipping short fold");
            }
            start = end;
        }
        folds
    }

    /// Score each fold with `engine`.
    pub fn evaluate(
        &self,
        engine: &BacktestEngine,
        series: &PriceSeries,
    ) -> Vec<(Fold, BacktestStats)> {
        self.folds(series)
            .into_iter()
            .filter_map(|fold| {
                let prefix = series.prefix(fold.prefix_len())?;
                let report = engine.run(&prefix);
                let scored: Vec<_> = report
                    .trades
                    .into_iter()
                    .filter(|t| fold.contains(t.entry_time.timestamp_millis()))
                    .collect();
                let stats = BacktestStats::from_trades(&scored);
                Some((fold, stats))
            })
            .collect()
    }
}
