//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

use crate::config::LogConfig;
use log::LevelFilter;

/// Initialize the logging system from the engine's log options
///
/// Returns `false` when a global logger was already installed, in which
/// case the existing logger stays in place.
pub fn init(config: &LogConfig) -> bool {
    env_logger::Builder::new()
        .filter_level(level_filter(config))
        .try_init()
        .is_ok()
}

/// Resolve the configured level name, falling back to `debug`
pub fn level_filter(config: &LogConfig) -> LevelFilter {
    config.level.parse().unwrap_or(LevelFilter::Debug)
}
