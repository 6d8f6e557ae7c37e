use thiserror::Error;

/// Errors raised by configuration loading and the replay tool
///
/// The hook itself has no failure modes; query errors travel through it as
/// data and never surface here.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Invalid or unreadable settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed replay script
    #[error("Script error: {0}")]
    Script(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A global tracing subscriber could not be installed
    #[error("Subscriber error: {0}")]
    Subscriber(String),
}

impl From<config::ConfigError> for ReplayError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::de::Error> for ReplayError {
    fn from(err: toml::de::Error) -> Self {
        Self::Script(format!("TOML error: {}", err))
    }
}
