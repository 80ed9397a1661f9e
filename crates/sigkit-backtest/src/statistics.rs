//! Backtest statistics.

use serde::{Deserialize, Serialize};

use sigkit_core::types::TradeResult;

/// Aggregate metrics over completed trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestStats {
    /// Total number of trades
    pub total_trades: usize,
    /// Trades with pnl > 0
    pub winning_trades: usize,
    /// Trades with pnl < 0
    pub losing_trades: usize,
    /// wins / total, 0 without trades
    pub winrate: f64,
    /// Sum of positive pnl
    pub gross_profit: f64,
    /// Magnitude of the sum of negative pnl
    pub gross_loss: f64,
    /// gross_profit / gross_loss; infinite with gains and no losses, 0 without gains or losses
    pub profit_factor: f64,
    /// Largest drop from a running peak of the equity curve
    pub max_drawdown: f64,
    /// Cumulative pnl after each trade
    pub equity_curve: Vec<f64>,
}

impl BacktestStats {
    /// Calculate statistics from trades in replay order.
    pub fn from_trades(trades: &[TradeResult]) -> Self {
        let total_trades = trades.len();
        if total_trades == 0 {
            return Self::default();
        }

        let mut stats = Self {
            total_trades,
            ..Default::default()
        };

        let mut equity = 0.0;
        let mut peak = 0.0_f64;
        stats.equity_curve.reserve(total_trades);

        for trade in trades {
            if trade.is_win() {
                stats.winning_trades += 1;
                stats.gross_profit += trade.pnl;
            } else if trade.is_loss() {
                stats.losing_trades += 1;
                stats.gross_loss += -trade.pnl;
            }

            equity += trade.pnl;
            peak = peak.max(equity);
            stats.max_drawdown = stats.max_drawdown.max(peak - equity);
            stats.equity_curve.push(equity);
        }

        stats.winrate = stats.winning_trades as f64 / total_trades as f64;
        stats.profit_factor = if stats.losing_trades > 0 {
            stats.gross_profit / stats.gross_loss
        } else if stats.gross_profit > 0.0 {
            f64::INFINITY
        } else {
            // Only flat trades
            0.0
        };

        stats
    }

    /// Net pnl over all trades.
    pub fn net_pnl(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use sigkit_core::types::SignalStatus;

    fn trade(pnl: f64) -> TradeResult {
        let t = DateTime::from_timestamp(0, 0).unwrap();
        TradeResult {
            ticker: "T".into(),
            entry_time: t,
            exit_time: t,
            entry: 100.0,
            exit: 100.0 + pnl,
            pnl,
            status: if pnl > 0.0 { SignalStatus::Tp } else { SignalStatus::Sl },
            tp: 105.0,
            sl: 95.0,
        }
    }

    #[test]
    fn test_no_trades() {
        let stats = BacktestStats::from_trades(&[]);
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.winrate, 0.0);
        assert_eq!(stats.profit_factor, 0.0);
        assert_eq!(stats.max_drawdown, 0.0);
        assert!(stats.equity_curve.is_empty());
    }

    #[test]
    fn test_no_losses_is_infinite() {
        let stats = BacktestStats::from_trades(&[trade(5.0), trade(3.0)]);
        assert!(stats.profit_factor.is_infinite());
        assert_eq!(stats.winrate, 1.0);
    }

    #[test]
    fn test_flat_trades_have_zero_profit_factor() {
        let stats = BacktestStats::from_trades(&[trade(0.0), trade(0.0)]);
        assert_eq!(stats.total_trades, 2);
        assert_eq!(stats.winrate, 0.0);
        assert_eq!(stats.profit_factor, 0.0);

        let stats = BacktestStats::from_trades(&[trade(0.0), trade(2.0)]);
        assert!(stats.profit_factor.is_infinite());
    }

    #[test]
    fn test_mixed_trades() {
        let stats = BacktestStats::from_trades(&[trade(5.0), trade(-2.0), trade(-3.0), trade(4.0)]);

        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 2);
        assert_eq!(stats.winrate, 0.5);
        assert!((stats.profit_factor - 9.0 / 5.0).abs() < 1e-12);
        assert_eq!(stats.equity_curve, vec![5.0, 3.0, 0.0, 4.0]);
        assert_eq!(stats.max_drawdown, 5.0);
        assert_eq!(stats.net_pnl(), 4.0);
    }

    #[test]
    fn test_drawdown_from_zero_peak() {
        let stats = BacktestStats::from_trades(&[trade(-2.0), trade(-1.0)]);
        assert_eq!(stats.max_drawdown, 3.0);
        assert_eq!(stats.profit_factor, 0.0);
    }
}
