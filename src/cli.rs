use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "query-hook-replay", version, about = "Replay query events through the query log hook")]
pub struct Cli {
    /// Settings file path (optional; defaults and QUERY_HOOK__* env vars apply)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replay a script and log what the hook emits
    Run {
        /// Replay script (TOML)
        #[arg(short, long)]
        script: PathBuf,

        /// Override the slow-query threshold in milliseconds
        #[arg(long)]
        slow_ms: Option<u64>,

        /// Override the log output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Validate a replay script without running it
    Check {
        /// Replay script (TOML)
        #[arg(short, long)]
        script: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for query_hook_log::LogFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
