//! End-to-end scenarios: generate signals, replay them, aggregate.

use chrono::DateTime;
use sigkit_backtest::{
    simulate_signal, BacktestConfig, BacktestEngine, BacktestReport, EntryAlignment,
};
use sigkit_core::types::{Bar, NewSignal, PriceSeries, Signal, SignalStatus};
use sigkit_strategy::{SignalGenerator, SignalParams};

const DAY: i64 = 86_400_000;
const START: i64 = 1_704_067_200_000; // 2024-01-01

fn rising_series() -> PriceSeries {
    let bars = (0..50)
        .map(|i| {
            let c = 100.0 + i as f64;
            Bar::new(START + i as i64 * DAY, c, c, c, c, 1_000.0)
        })
        .collect();
    PriceSeries::new("RISE", bars).unwrap()
}

#[test]
fn rising_series_yields_priced_buy_signal() {
    let generator = SignalGenerator::new(SignalParams::default()).unwrap();
    let batch = generator.generate(&rising_series());

    assert!(!batch.is_empty());
    for signal in &batch.signals {
        assert!(signal.entry > 0.0 && signal.tp > 0.0 && signal.sl > 0.0);
        assert!(signal.tp > signal.entry);
        assert!(signal.entry > signal.sl);
        assert_eq!(signal.status, SignalStatus::Open);
    }
}

#[test]
fn rising_series_backtest_is_reproducible() {
    let engine = BacktestEngine::new(BacktestConfig::default()).unwrap();
    let series = rising_series();

    let first = engine.run(&series);
    let second = engine.run(&series);

    assert_eq!(first, second);
    assert!(first.total_trades > 0);
    // Nothing ever falls on a rising series, so no trade can stop out.
    assert!(first.trades.iter().all(|t| t.status != SignalStatus::Sl));
    assert_eq!(first.losses, 0);
    if first.net_pnl > 0.0 {
        assert!(first.profit_factor.is_infinite());
    } else {
        assert_eq!(first.profit_factor, 0.0);
    }
}

#[test]
fn spike_bar_resolves_to_take_profit() {
    let closes = [10.5, 11.5, 12.5, 13.5, 14.5];
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let high = if i == closes.len() - 1 { 50.0 } else { c };
            Bar::new(START + i as i64 * DAY, c, high, c, c, 0.0)
        })
        .collect();
    let series = PriceSeries::new("SPIKE", bars).unwrap();

    let signal = Signal::open(
        "open-1",
        NewSignal {
            ticker: "SPIKE".into(),
            timestamp: DateTime::from_timestamp_millis(START).unwrap(),
            entry: 10.5,
            tp: 40.0,
            sl: 5.0,
            strategy_version: "v1-strict".into(),
        },
    );

    let trade = simulate_signal(&signal, &series, EntryAlignment::Exact).unwrap();
    assert_eq!(trade.status, SignalStatus::Tp);
    assert_eq!(trade.exit, 40.0);
    assert_ne!(trade.exit, 14.5);
}

#[test]
fn no_signals_gives_zeroed_report() {
    // Steady decline: the fast EMA never rises above the slow one.
    let bars = (0..30)
        .map(|i| {
            let c = 100.0 - i as f64;
            Bar::new(START + i * DAY, c, c + 0.5, c - 0.5, c, 0.0)
        })
        .collect();
    let series = PriceSeries::new("FLAT", bars).unwrap();
    let engine = BacktestEngine::new(BacktestConfig::default()).unwrap();

    let report = engine.run(&series);
    assert_eq!(report, BacktestReport::empty("FLAT"));
    assert_eq!(report.winrate, 0.0);
    assert_eq!(report.profit_factor, 0.0);
    assert_eq!(report.max_drawdown, 0.0);
}
