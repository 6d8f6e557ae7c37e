use crate::error::ReplayError;
use crate::hook::HookOptions;
use crate::sink::LogSink;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable prefix for replay settings
pub const ENV_PREFIX: &str = "QUERY_HOOK";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Serializable hook settings for applications that keep configuration in files
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HookSettings {
    /// Successful queries at or above this many milliseconds are logged
    #[serde(default)]
    pub slow_threshold_ms: u64,
}

impl HookSettings {
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }

    /// Build hook options that emit to `sink`
    pub fn to_options(&self, sink: Arc<dyn LogSink>) -> HookOptions {
        HookOptions::new()
            .with_sink(sink)
            .with_slow_threshold(self.slow_threshold())
    }
}

/// Output format for the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingSettings {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Settings for the `query-hook-replay` tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub hook: HookSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Load replay settings from defaults, an optional file and the environment
///
/// Environment variables use the `QUERY_HOOK` prefix with `__` between
/// nested keys, e.g. `QUERY_HOOK__HOOK__SLOW_THRESHOLD_MS=250`.
pub fn load_config(path: Option<&Path>) -> Result<ReplayConfig, ReplayError> {
    let defaults = LoggingSettings::default();
    let mut builder = config::Config::builder()
        .set_default("hook.slow_threshold_ms", 0_i64)?
        .set_default("logging.level", defaults.level)?
        .set_default("logging.format", "text")?;

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: ReplayConfig = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &ReplayConfig) -> Result<(), ReplayError> {
    let level = cfg.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ReplayError::Config(format!(
            "Invalid log level '{}', expected one of: {}",
            cfg.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    Ok(())
}
