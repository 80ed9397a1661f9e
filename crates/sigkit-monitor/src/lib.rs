//! Logging setup.

mod logging;

pub use logging::{setup_logging, split_log_path};
pub use tracing_appender::non_blocking::WorkerGuard;
