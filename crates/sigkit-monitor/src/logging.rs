//! Logging setup.

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use sigkit_core::error::{SigkitError, SigkitResult};

/// Directory and file-name prefix for a daily rolling log file.
pub fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("sigkit.log")
        .to_string();
    (dir, name)
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level`. With `file`, a JSON copy of every event
/// goes to a daily rolling file; keep the returned guard alive until exit
/// so buffered lines get flushed.
pub fn setup_logging(
    level: &str,
    json: bool,
    file: Option<&Path>,
) -> SigkitResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().pretty().boxed()
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let (dir, name) = split_log_path(path);
            fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| SigkitError::Config(format!("logging already initialised: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        assert_eq!(
            split_log_path(Path::new("logs/sigkit.log")),
            (PathBuf::from("logs"), "sigkit.log".to_string())
        );
        assert_eq!(
            split_log_path(Path::new("watch.log")),
            (PathBuf::from("."), "watch.log".to_string())
        );
    }

    #[test]
    fn test_setup_creates_log_dir_and_rejects_second_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("sigkit.log");

        let guard = setup_logging("debug", false, Some(&path)).unwrap();
        assert!(guard.is_some());
        assert!(dir.path().join("logs").is_dir());

        assert!(setup_logging("info", true, None).is_err());
    }
}
