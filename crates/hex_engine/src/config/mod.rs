//! Configuration system
//!
//! `HexConfig` is a plain option bag. Every field carries a serde default,
//! so a partial TOML or RON file is merged with the defaults on load.

pub use serde::{Serialize, Deserialize};

/// Default tick interval in seconds (60 ticks per second)
pub const DEFAULT_TICK_INTERVAL: f64 = 1.0 / 60.0;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let parse: fn(&str) -> Result<Self, ConfigError> = if path.ends_with(".toml") {
            Self::from_toml_str
        } else if path.ends_with(".ron") {
            Self::from_ron_str
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        parse(&contents)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Parse configuration from a TOML string
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse configuration from a RON string
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level to output (`debug`, `info`, `warn`, `error` or `off`)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Tick cadence, run length, rendering and logging options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexConfig {
    /// Seconds between ticks
    pub tick_interval: f64,
    /// Stop automatically after this many ticks
    pub max_ticks: Option<u64>,
    /// Whether the interpolated render pass runs
    pub enable_rendering: bool,
    /// Count system runs and ticks with a [`Profiler`](crate::foundation::profiler::Profiler)
    pub enable_profiling: bool,
    /// Seed for deterministic randomness in user systems
    pub rng_seed: u64,
    /// Logging options
    pub log: LogConfig,
}

impl HexConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_ticks: None,
            enable_rendering: false,
            enable_profiling: false,
            rng_seed: 0,
            log: LogConfig::default(),
        }
    }

    /// Set the tick interval in seconds
    pub fn with_tick_interval(mut self, seconds: f64) -> Self {
        self.tick_interval = seconds;
        self
    }

    /// Stop after `ticks` ticks
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Enable or disable the render pass
    pub fn with_rendering(mut self, enabled: bool) -> Self {
        self.enable_rendering = enabled;
        self
    }

    /// Enable or disable profiling
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.enable_profiling = enabled;
        self
    }

    /// Set the RNG seed
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Set the minimum log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log.level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_interval.is_finite() || self.tick_interval <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tick_interval must be positive, got {}",
                self.tick_interval
            )));
        }
        Ok(())
    }
}

impl Default for HexConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for HexConfig {}
