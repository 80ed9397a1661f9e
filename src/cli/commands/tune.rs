//! Parameter tuning command.

use anyhow::{Context, Result};
use tracing::info;

use sigkit_backtest::format_profit_factor;
use sigkit_config::AppConfig;
use sigkit_data::load_price_csv;
use sigkit_tuner::{export_csv, ParamGrid, Tuner, WalkForward};

use super::load_series;
use crate::cli::TuneArgs;

pub async fn run(args: TuneArgs, config: &AppConfig) -> Result<()> {
    let grid = match (&args.preset, &args.grid) {
        (Some(name), _) => ParamGrid::preset(name)?,
        (None, Some(json)) => ParamGrid::from_json(json)?,
        (None, None) => anyhow::bail!("Provide --preset or --grid"),
    };

    let series = match &args.csv {
        Some(path) => load_price_csv(path, &args.ticker)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => load_series(&config.paths.data_dir, &args.ticker)?,
    };

    let mut tuner = Tuner::new(config.backtest_config()).with_parallelism(!args.sequential);
    if let Some(days) = args.walk {
        if days <= 0 {
            anyhow::bail!("--walk must be a positive number of days");
        }
        tuner = tuner.with_walk_forward(WalkForward::days(days));
    }

    info!(
        ticker = %args.ticker,
        combinations = grid.size(),
        walk = ?args.walk,
        "Running tuning"
    );
    let rows = tuner.run(&series, &grid)?;

    let out_dir = args.out.clone().unwrap_or_else(|| config.paths.tuning_dir.clone());
    let path = export_csv(&out_dir, &args.ticker, &rows)?;

    for row in rows.iter().take(10) {
        let params: Vec<String> = row.params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        println!(
            "{:<45} folds={:<3} winrate={:>6.2}% pf={:<8} trades={:<4} dd={:.4}",
            params.join(" "),
            row.folds,
            row.avg_winrate * 100.0,
            format_profit_factor(row.avg_profit_factor),
            row.total_trades,
            row.avg_max_drawdown
        );
    }
    println!("Tuning results saved to: {}", path.display());
    Ok(())
}
