//! Backtesting engine.
//!
//! Replays each signal forward from its entry bar until TP or SL is hit
//! (TP checked first within a bar), or closes it at the last close.

mod engine;
mod reconcile;
mod report;
mod statistics;

pub use engine::{simulate_signal, BacktestConfig, BacktestEngine, EntryAlignment};
pub use reconcile::{
    compare_trades, read_trades_csv, write_mismatch_report, Mismatch, ReconcileSummary, TradeRow,
};
pub use report::{format_profit_factor, BacktestReport};
pub use statistics::BacktestStats;
