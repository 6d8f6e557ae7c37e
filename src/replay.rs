//! Replay scripted query events through a hook
//!
//! A script is a TOML document with one `[[events]]` table per query:
//!
//! ```toml
//! [[events]]
//! query = "SELECT * FROM users WHERE id = $1"
//! elapsed_ms = 300
//!
//! [[events]]
//! query = "INSERT INTO users (name) VALUES ($1)"
//! error = "duplicate key value violates unique constraint"
//! ```

use crate::error::ReplayError;
use crate::event::QueryEvent;
use crate::hook::QueryLogHook;
use crate::record::LogAction;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Error value attached to scripted failures
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ScriptedError(pub String);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScriptEvent {
    pub query: String,
    #[serde(default)]
    pub elapsed_ms: u64,
    /// Overrides the label derived from the query
    pub operation: Option<String>,
    pub error: Option<String>,
}

impl ScriptEvent {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Build the event as if the query started `elapsed_ms` before `now`
    pub fn to_event(&self, now: Instant) -> Result<QueryEvent, ReplayError> {
        let start_time = now.checked_sub(self.elapsed()).ok_or_else(|| {
            ReplayError::Script(format!(
                "elapsed_ms {} is out of range for query '{}'",
                self.elapsed_ms, self.query
            ))
        })?;

        let mut event = QueryEvent::new(self.query.as_str()).with_start_time(start_time);
        if let Some(operation) = &self.operation {
            event = event.with_operation(operation.as_str());
        }
        if let Some(message) = &self.error {
            event = event.with_error(ScriptedError(message.clone()));
        }

        Ok(event)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl ReplayScript {
    pub fn parse(contents: &str) -> Result<Self, ReplayError> {
        let script: ReplayScript = toml::from_str(contents)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn validate(&self) -> Result<(), ReplayError> {
        for (index, event) in self.events.iter().enumerate() {
            if event.query.trim().is_empty() {
                return Err(ReplayError::Script(format!(
                    "event #{} has an empty query",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Counts of what a replay emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub suppressed: usize,
    pub debug: usize,
    pub error: usize,
}

impl ReplaySummary {
    fn record(&mut self, action: &LogAction) {
        match action {
            LogAction::Suppress => self.suppressed += 1,
            LogAction::Debug(_) => self.debug += 1,
            LogAction::Error(_) => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.suppressed + self.debug + self.error
    }
}

/// Run every scripted event through `hook`
///
/// Events go through [`QueryLogHook::log_elapsed`] with the scripted elapsed
/// time, so results do not depend on how fast the replay itself runs.
pub fn run_script(hook: &QueryLogHook, script: &ReplayScript) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();

    for scripted in &script.events {
        let event = scripted.to_event(Instant::now())?;
        let action = hook.log_elapsed(&event, scripted.elapsed());
        summary.record(&action);
    }

    tracing::info!(
        total = summary.total(),
        suppressed = summary.suppressed,
        debug = summary.debug,
        error = summary.error,
        "Replay finished"
    );

    Ok(summary)
}
