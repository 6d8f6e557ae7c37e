use anyhow::{Context, Result};
use colored::Colorize;
use query_hook_log::{config, replay::ReplayScript, HookOptions, LogAction, QueryLogHook};
use std::path::Path;

/// Execute the check command
///
/// Validates the script and reports how each event would be classified
/// under the configured threshold, without emitting anything.
pub fn execute(config_path: Option<&Path>, script_path: &Path) -> Result<()> {
    println!("{}", "Checking replay script...".yellow());

    let cfg = config::load_config(config_path)?;
    let script = ReplayScript::load(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;

    // No sink: classification only
    let hook = QueryLogHook::new(HookOptions::new().with_slow_threshold(cfg.hook.slow_threshold()));

    println!("{}", "✓ Script is valid".green());
    println!();
    println!("{}", "Events:".bold());
    for (idx, scripted) in script.events.iter().enumerate() {
        let event = scripted.to_event(std::time::Instant::now())?;
        let outcome = match hook.log_elapsed(&event, scripted.elapsed()) {
            LogAction::Suppress => "suppressed".dimmed(),
            LogAction::Debug(_) => "debug".yellow(),
            LogAction::Error(_) => "error".red(),
        };
        println!(
            "  {}. [{}] {} ({}ms) → {}",
            idx + 1,
            event.operation,
            event.query,
            scripted.elapsed_ms,
            outcome
        );
    }
    println!();
    println!("  {}: {}", "Total".cyan(), script.len());

    Ok(())
}
