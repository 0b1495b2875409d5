//! Command line argument parsing and validation.

use crate::config::{check_timeout, FileConfig};
use crate::publish::{PublishConfig, DEFAULT_OPERATION_TIMEOUT};
use crate::workspace::Selection;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Workspace Publish - validate and publish every crate in a Cargo workspace
#[derive(Parser, Debug)]
#[command(
    name = "workspace_publish",
    version,
    about = "Validate and publish every crate in a Cargo workspace",
    long_about = "Runs `cargo publish --dry-run` for each local workspace package and,
after an explicit yes from the operator, `cargo publish`. The first failure
stops the run with exit code 1."
)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to the workspace Cargo.toml (defaults to cargo's lookup from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    /// Configuration file path (defaults to .workspace_publish.toml in the workspace root)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dry-run every local package, then publish each one you confirm
    Publish {
        /// Only run the dry-run validation; never prompt or publish
        #[arg(short, long)]
        dry_run: bool,

        /// Answer yes to every publish prompt
        #[arg(short, long, conflicts_with = "dry_run")]
        yes: bool,

        /// Registry to publish to (defaults to crates.io)
        #[arg(long, value_name = "REGISTRY")]
        registry: Option<String>,

        /// Pass --allow-dirty to cargo publish
        #[arg(long)]
        allow_dirty: bool,

        /// Only visit these packages (repeatable)
        #[arg(short, long = "package", value_name = "NAME")]
        packages: Vec<String>,

        /// Skip these packages (repeatable)
        #[arg(long, value_name = "NAME")]
        exclude: Vec<String>,

        /// Also visit packages whose `publish` field excludes the registry
        #[arg(long)]
        include_unpublishable: bool,

        /// Timeout for each cargo invocation in seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// List the local packages a publish run would visit
    List {
        /// Format output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Parse command line arguments, leaving usage errors to the caller
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Check if running in verbose mode
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref manifest) = self.manifest_path {
            if !manifest.is_file() {
                return Err(format!("Manifest path does not exist: {}", manifest.display()));
            }
        }

        if let Command::Publish {
            timeout: Some(timeout),
            ..
        } = &self.command
        {
            check_timeout(*timeout)?;
        }

        Ok(())
    }
}

impl Command {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Command::Publish { .. } => "publish",
            Command::List { .. } => "list",
        }
    }
}

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Minimal output, only errors
    Quiet,
    /// Standard output level
    Normal,
    /// Detailed output with debug information
    Verbose,
}

impl VerbosityLevel {
    /// Default log filter for this verbosity
    pub fn log_filter(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

impl From<&Args> for VerbosityLevel {
    fn from(args: &Args) -> Self {
        if args.quiet {
            VerbosityLevel::Quiet
        } else if args.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Configuration derived from command line arguments and the config file
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Verbosity level
    pub verbosity: VerbosityLevel,
    /// Per-command timeout
    pub timeout: Duration,
    /// Options forwarded to cargo publish
    pub publish: PublishConfig,
    /// Which packages to visit
    pub selection: Selection,
    /// Validate only
    pub dry_run: bool,
    /// Skip the prompts
    pub assume_yes: bool,
}

impl RuntimeConfig {
    /// Settings before any config file is read
    pub fn from_args(args: &Args) -> Self {
        Self::merge(args, &FileConfig::default())
    }

    /// Combine command line flags with file settings; flags win
    pub fn merge(args: &Args, file: &FileConfig) -> Self {
        let verbosity = VerbosityLevel::from(args);
        let file_timeout = file.timeout_secs.map(Duration::from_secs);

        match &args.command {
            Command::Publish {
                dry_run,
                yes,
                registry,
                allow_dirty,
                packages,
                exclude,
                include_unpublishable,
                timeout,
            } => {
                let registry = registry.clone().or_else(|| file.registry.clone());

                let mut excluded = file.exclude.clone();
                for name in exclude {
                    if !excluded.contains(name) {
                        excluded.push(name.clone());
                    }
                }

                Self {
                    verbosity,
                    timeout: timeout
                        .map(Duration::from_secs)
                        .or(file_timeout)
                        .unwrap_or(DEFAULT_OPERATION_TIMEOUT),
                    publish: PublishConfig {
                        registry: registry.clone(),
                        allow_dirty: *allow_dirty || file.allow_dirty.unwrap_or(false),
                        additional_args: file.extra_args.clone(),
                    },
                    selection: Selection {
                        packages: packages.clone(),
                        exclude: excluded,
                        registry,
                        include_unpublishable: *include_unpublishable,
                    },
                    dry_run: *dry_run,
                    assume_yes: *yes,
                }
            }
            Command::List { .. } => Self {
                verbosity,
                timeout: file_timeout.unwrap_or(DEFAULT_OPERATION_TIMEOUT),
                publish: PublishConfig {
                    registry: file.registry.clone(),
                    ..Default::default()
                },
                selection: Selection {
                    exclude: file.exclude.clone(),
                    registry: file.registry.clone(),
                    ..Default::default()
                },
                dry_run: true,
                assume_yes: false,
            },
        }
    }

    /// Check if output should be suppressed
    pub fn is_quiet(&self) -> bool {
        self.verbosity == VerbosityLevel::Quiet
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbosity == VerbosityLevel::Verbose
    }

    /// Print message if not in quiet mode
    pub fn println(&self, message: &str) {
        if !self.is_quiet() {
            println!("{}", message);
        }
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        if self.is_verbose() {
            println!("🔍 {}", message);
        }
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        eprintln!("❌ {}", message);
    }

    /// Print warning message if not in quiet mode
    pub fn warning_println(&self, message: &str) {
        if !self.is_quiet() {
            println!("⚠️ {}", message);
        }
    }

    /// Print success message if not in quiet mode
    pub fn success_println(&self, message: &str) {
        if !self.is_quiet() {
            println!("✅ {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("workspace_publish").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn publish_defaults() {
        let args = parse(&["publish"]);
        let config = RuntimeConfig::from_args(&args);

        assert!(!config.dry_run);
        assert!(!config.assume_yes);
        assert_eq!(config.timeout, DEFAULT_OPERATION_TIMEOUT);
        assert_eq!(config.publish.registry, None);
        assert!(config.selection.packages.is_empty());
        assert_eq!(config.verbosity, VerbosityLevel::Normal);
    }

    #[test]
    fn dry_run_conflicts_with_yes() {
        let result = Args::try_parse_from(["workspace_publish", "publish", "--dry-run", "--yes"]);
        assert!(result.is_err());
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        let result = Args::try_parse_from(["workspace_publish", "-v", "-q", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn repeated_package_flags_collect() {
        let args = parse(&["publish", "-p", "rivus-core", "--package", "rivus-web", "--exclude", "rivus-ws"]);
        let config = RuntimeConfig::from_args(&args);

        assert_eq!(config.selection.packages, vec!["rivus-core", "rivus-web"]);
        assert_eq!(config.selection.exclude, vec!["rivus-ws"]);
    }

    #[test]
    fn flags_override_file() {
        let args = parse(&["publish", "--registry", "staging", "--timeout", "120", "--exclude", "b"]);
        let file = FileConfig {
            registry: Some("internal".to_string()),
            allow_dirty: Some(true),
            exclude: vec!["a".to_string(), "b".to_string()],
            timeout_secs: Some(900),
            extra_args: vec!["--no-verify".to_string()],
        };

        let config = RuntimeConfig::merge(&args, &file);
        assert_eq!(config.publish.registry.as_deref(), Some("staging"));
        assert_eq!(config.selection.registry.as_deref(), Some("staging"));
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.publish.allow_dirty);
        assert_eq!(config.publish.additional_args, vec!["--no-verify"]);
        assert_eq!(config.selection.exclude, vec!["a", "b"]);
    }

    #[test]
    fn file_fills_missing_flags() {
        let args = parse(&["publish"]);
        let file = FileConfig {
            registry: Some("internal".to_string()),
            timeout_secs: Some(900),
            ..Default::default()
        };

        let config = RuntimeConfig::merge(&args, &file);
        assert_eq!(config.publish.registry.as_deref(), Some("internal"));
        assert_eq!(config.timeout, Duration::from_secs(900));
        assert!(!config.publish.allow_dirty);
    }

    #[test]
    fn timeout_bounds_are_checked() {
        assert!(parse(&["publish", "--timeout", "10"]).validate().is_err());
        assert!(parse(&["publish", "--timeout", "7200"]).validate().is_err());
        assert!(parse(&["publish", "--timeout", "60"]).validate().is_ok());
    }

    #[test]
    fn missing_manifest_is_rejected() {
        let args = parse(&["--manifest-path", "/nonexistent/Cargo.toml", "list"]);
        assert!(args.validate().unwrap_err().contains("does not exist"));
    }
}
