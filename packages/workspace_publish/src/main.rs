//! Workspace Publish - dry-run validation and confirmed publishing for
//! every crate in a Cargo workspace.

use std::process;
use workspace_publish::cli::{self, VerbosityLevel};

#[tokio::main]
async fn main() {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version arrive here too and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let verbosity = VerbosityLevel::from(&args);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.log_filter()),
    )
    .format_timestamp(None)
    .init();

    match cli::run(args).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("❌ Fatal error: {}", e);

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {}", suggestion);
                }
            }

            process::exit(e.exit_code());
        }
    }
}
