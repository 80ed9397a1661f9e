//! Engine vs backtest reconciliation command.

use anyhow::Result;

use sigkit_backtest::{compare_trades, read_trades_csv, write_mismatch_report};
use sigkit_config::AppConfig;

use crate::cli::CompareArgs;

pub async fn run(args: CompareArgs, config: &AppConfig) -> Result<()> {
    let engine = read_trades_csv(&args.engine)?;
    let backtest = read_trades_csv(&args.backtest)?;

    let (summary, mismatches) = compare_trades(&args.ticker, &engine, &backtest);
    println!("Ticker:          {}", summary.ticker);
    println!("Engine trades:   {}", summary.engine_count);
    println!("Backtest trades: {}", summary.backtest_count);
    println!("Matched:         {}", summary.matched);
    println!("Mismatches:      {}", summary.mismatches);
    println!("Wins (engine):   {}", summary.wins_engine);
    println!("Wins (backtest): {}", summary.wins_backtest);

    if !mismatches.is_empty() {
        let out = args.out.clone().unwrap_or_else(|| config.paths.reports_dir.clone());
        let path = write_mismatch_report(&out, &args.ticker, &mismatches)?;
        println!("Mismatch details saved to {}", path.display());
    }
    Ok(())
}
