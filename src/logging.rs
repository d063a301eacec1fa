//! Logger setup

use crate::config::LogLevel;

/// Install `env_logger` as the global logger
///
/// `RUST_LOG` wins over `level` when it is set. Calling this twice is
/// harmless; the second call leaves the first logger in place.
pub fn init(level: LogLevel) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level.to_level_filter());

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
