//! Configuration commands.

use anyhow::Result;
use std::path::Path;

use sigkit_config::{to_toml, AppConfig};

use crate::cli::ShowConfigArgs;

pub async fn validate(path: &Path, config: &AppConfig) -> Result<()> {
    println!("Validating configuration: {}", path.display());
    if !path.exists() {
        println!("File not found, using defaults");
    }

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!(
        "Strategy: EMA {}/{} SMA {} ATR {} ({})",
        config.strategy.ema_fast,
        config.strategy.ema_slow,
        config.strategy.sma_trend,
        config.strategy.atr_period,
        config.strategy.version
    );
    println!(
        "Risk: balance {} risk/trade {} lot {}",
        config.risk.balance, config.risk.risk_per_trade, config.risk.lot_size
    );
    println!("Data dir: {}", config.paths.data_dir.display());
    println!("Signals dir: {}", config.paths.signals_dir.display());
    println!(
        "Telegram credentials: {}",
        if config.telegram.bot_token.is_some() && config.telegram.chat_id.is_some() {
            "set"
        } else {
            "missing"
        }
    );
    Ok(())
}

pub async fn show(args: ShowConfigArgs, config: &AppConfig) -> Result<()> {
    let shown = if args.effective {
        let mut shown = config.clone();
        if shown.telegram.bot_token.is_some() {
            shown.telegram.bot_token = Some("***".to_string());
        }
        shown
    } else {
        AppConfig::default()
    };
    print!("{}", to_toml(&shown)?);
    Ok(())
}
