//! Backtesting engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use sigkit_core::error::StrategyError;
use sigkit_core::types::{PriceSeries, Signal, SignalStatus, TradeResult};
use sigkit_strategy::{SignalGenerator, SignalParams};

use crate::report::BacktestReport;
use crate::statistics::BacktestStats;

/// How a signal's entry time is matched against the bar index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryAlignment {
    /// Entry time must equal a bar timestamp
    #[default]
    Exact,
    /// Fall back to the nearest earlier bar
    Prior,
}

impl fmt::Display for EntryAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryAlignment::Exact => write!(f, "exact"),
            EntryAlignment::Prior => write!(f, "prior"),
        }
    }
}

impl FromStr for EntryAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(EntryAlignment::Exact),
            "prior" => Ok(EntryAlignment::Prior),
            other => Err(format!("Invalid entry alignment: {}", other)),
        }
    }
}

/// Replay one signal over the price series.
///
/// Bars are scanned from the entry bar forward. On each bar TP is checked
/// before SL, so a bar touching both resolves to TP. Without a hit the
/// trade closes at the last close with status END. Returns `None` when the
/// entry time cannot be aligned to a bar.
pub fn simulate_signal(
    signal: &Signal,
    series: &PriceSeries,
    alignment: EntryAlignment,
) -> Option<TradeResult> {
    let entry_ts = signal.entry_millis();
    let start = match alignment {
        EntryAlignment::Exact => series.position_of(entry_ts),
        EntryAlignment::Prior => series.position_at_or_before(entry_ts),
    }?;

    let mut exit = None;
    for bar in series.bars_from(start) {
        if bar.high >= signal.tp {
            exit = Some((signal.tp, bar.datetime(), SignalStatus::Tp));
            break;
        }
        if bar.low <= signal.sl {
            exit = Some((signal.sl, bar.datetime(), SignalStatus::Sl));
            break;
        }
    }

    let (exit_price, exit_time, status) = match exit {
        Some(hit) => hit,
        None => {
            let last = series.last()?;
            (last.close, last.datetime(), SignalStatus::End)
        }
    };

    Some(TradeResult {
        ticker: signal.ticker.clone(),
        entry_time: signal.timestamp,
        exit_time,
        entry: signal.entry,
        exit: exit_price,
        pnl: exit_price - signal.entry,
        status,
        tp: signal.tp,
        sl: signal.sl,
    })
}

/// Backtest configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Signal generator parameters
    pub signal_params: SignalParams,
    /// Entry alignment policy
    pub entry_alignment: EntryAlignment,
}

/// Backtesting engine.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
    generator: SignalGenerator,
}

impl BacktestEngine {
    /// Create a new backtest engine.
    pub fn new(config: BacktestConfig) -> Result<Self, StrategyError> {
        let generator = SignalGenerator::new(config.signal_params.clone())?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Generate signals on the full series and replay them.
    pub fn run(&self, series: &PriceSeries) -> BacktestReport {
        let batch = self.generator.generate(series);
        info!(
            symbol = %series.symbol,
            signals = batch.len(),
            strict = batch.strict_cross_count,
            fallback = batch.fallback_used,
            "Generated signals"
        );
        self.run_signals(series, &batch.signals)
    }

    /// Replay already generated signals.
    ///
    /// Signals whose entry cannot be aligned are skipped with a warning.
    pub fn run_signals(&self, series: &PriceSeries, signals: &[Signal]) -> BacktestReport {
        let trades = self.simulate_all(series, signals);
        let stats = BacktestStats::from_trades(&trades);

        info!(
            symbol = %series.symbol,
            trades = stats.total_trades,
            winrate = stats.winrate,
            profit_factor = stats.profit_factor,
            max_drawdown = stats.max_drawdown,
            "Backtest complete"
        );

        BacktestReport::new(series.symbol.clone(), stats, trades)
    }

    /// Replay signals and return their trades, dropping unaligned entries.
    pub fn simulate_all(&self, series: &PriceSeries, signals: &[Signal]) -> Vec<TradeResult> {
        let mut trades = Vec::with_capacity(signals.len());
        for signal in signals {
            match simulate_signal(signal, series, self.config.entry_alignment) {
                Some(trade) => {
                    debug!(
                        id = %signal.id,
                        status = %trade.status,
                        exit = trade.exit,
                        pnl = trade.pnl,
                        "Simulated signal"
                    );
                    trades.push(trade);
                }
                None => warn!(
                    id = %signal.id,
                    entry_time = %signal.timestamp,
                    "Entry time not in price index, signal dropped"
                ),
            }
        }
        trades
    }
}
