//! Configuration management.
//!
//! Settings come from an optional TOML file, then `SIGKIT__SECTION__KEY`
//! environment variables. Every section has defaults, so an empty or
//! missing file yields [`AppConfig::default`].

mod settings;

pub use settings::{
    AppConfig, AppSettings, BacktestSettings, LoggingConfig, NotifySettings, PathSettings,
    RiskSettings, WatcherSettings,
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::Path;

const ENV_PREFIX: &str = "SIGKIT";

/// Load configuration from file and environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    build(path, None)
}

fn build(
    path: Option<&Path>,
    env: Option<HashMap<String,
    String>>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("watcher.tickers")
                .source(env),
        )
        .build()?;

    config.try_deserialize()
}

/// Render a configuration as TOML.
pub fn to_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigkit_backtest::EntryAlignment;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let cfg = build(Some(Path::new("does/not/exist.toml")), Some(HashMap::new())).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sigkit.toml");
        fs::write(
            &path,
            "[strategy]\nema_fast = 5\nema_slow = 34\n\n[backtest]\nentry_alignment = \"prior\"\n",
        )
        .unwrap();

        let env = HashMap::from([
            ("SIGKIT__STRATEGY__EMA_FAST".to_string(), "7".to_string()),
            ("SIGKIT__WATCHER__TICKERS".to_string(), "BBCA.JK,TLKM.JK".to_string()),
        ]);
        let cfg = build(Some(&path), Some(env)).unwrap();

        assert_eq!(cfg.strategy.ema_fast, 7);
        assert_eq!(cfg.strategy.ema_slow, 34);
        assert_eq!(cfg.strategy.atr_period, 14);
        assert_eq!(cfg.backtest.entry_alignment, EntryAlignment::Prior);
        assert_eq!(cfg.watcher.tickers, vec!["BBCA.JK", "TLKM.JK"]);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = to_toml(&AppConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        fs::write(&path, text).unwrap();

        let cfg = build(Some(&path), Some(HashMap::new())).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }
}
