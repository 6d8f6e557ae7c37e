use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    match args.command {
        cli::Commands::Run {
            script,
            slow_ms,
            format,
        } => {
            commands::run::execute(args.config.as_deref(), &script, slow_ms, format)?;
        }
        cli::Commands::Check { script } => {
            commands::check::execute(args.config.as_deref(), &script)?;
        }
        cli::Commands::Version => {
            println!("query-hook-replay v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
