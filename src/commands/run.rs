use crate::cli::FormatArg;
use anyhow::{Context, Result};
use colored::Colorize;
use query_hook_log::{config, replay, QueryLogHook, TracingSink};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Execute the run command
///
/// Loads settings, installs the tracing subscriber, then replays the script
/// through a hook that emits via `tracing`.
pub fn execute(
    config_path: Option<&Path>,
    script_path: &Path,
    slow_ms: Option<u64>,
    format: Option<FormatArg>,
) -> Result<()> {
    let mut cfg = config::load_config(config_path)?;
    if let Some(ms) = slow_ms {
        cfg.hook.slow_threshold_ms = ms;
    }
    if let Some(format) = format {
        cfg.logging.format = format.into();
    }

    query_hook_log::init_tracing(&cfg.logging.level, cfg.logging.format)?;

    let script = replay::ReplayScript::load(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;

    let hook = QueryLogHook::new(cfg.hook.to_options(Arc::new(TracingSink::new())));
    info!(
        events = script.len(),
        slow_threshold_ms = cfg.hook.slow_threshold_ms,
        "Replaying query events"
    );

    let summary = replay::run_script(&hook, &script)?;

    eprintln!();
    eprintln!("{}", "Replay Summary:".bold());
    eprintln!("  {}: {}", "Events".cyan(), summary.total());
    eprintln!("  {}: {}", "Suppressed".cyan(), summary.suppressed);
    eprintln!("  {}: {}", "Debug".cyan(), summary.debug.to_string().yellow());
    eprintln!("  {}: {}", "Error".cyan(), summary.error.to_string().red());
    eprintln!(
        "  {}: {:?}",
        "Slow threshold".cyan(),
        Duration::from_millis(cfg.hook.slow_threshold_ms)
    );

    Ok(())
}
