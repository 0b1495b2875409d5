//! Command line interface for workspace_publish.

mod args;
mod commands;

pub use args::{Args, Command, RuntimeConfig, VerbosityLevel};
pub use commands::execute_command;

use crate::error::Result;

/// Main CLI entry point
pub async fn run(args: Args) -> Result<i32> {
    execute_command(args).await
}

/// Parse arguments without executing
pub fn parse_args() -> std::result::Result<Args, clap::Error> {
    Args::parse_args()
}

/// Validate arguments without executing
pub fn validate_args(args: &Args) -> Result<()> {
    args.validate()
        .map_err(|e| crate::error::CliError::InvalidArguments { reason: e }.into())
}
