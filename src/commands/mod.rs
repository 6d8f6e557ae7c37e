//! Command implementations for the CLI
//!
//! - run: replay a script through the hook with tracing output
//! - check: validate a replay script

pub mod check;
pub mod run;
