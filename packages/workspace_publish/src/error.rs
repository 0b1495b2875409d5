//! Error types for workspace_publish operations.
//!
//! Every failure aborts the run. The types here carry enough context to
//! tell the operator which package and which cargo step went wrong.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for workspace_publish operations
pub type Result<T> = std::result::Result<T, PublishAllError>;

/// Main error type for all workspace_publish operations
#[derive(Error, Debug)]
pub enum PublishAllError {
    /// Workspace discovery errors
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Cargo invocation errors
    #[error("Cargo error: {0}")]
    Cargo(#[from] CargoError),

    /// Configuration file errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Workspace metadata errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// `cargo metadata` exited unsuccessfully
    #[error("cargo metadata failed: {reason}")]
    MetadataFailed {
        /// Captured stderr of the metadata command
        reason: String,
    },

    /// `cargo metadata` produced output that could not be understood
    #[error("Invalid cargo metadata output: {reason}")]
    InvalidMetadata {
        /// Parse failure details
        reason: String,
    },

    /// Package requested on the command line is not a local workspace package
    #[error("Package '{name}' not found among local workspace packages")]
    PackageNotFound {
        /// Name that was requested
        name: String,
    },

    /// Manifest path has no parent directory
    #[error("Manifest path {path} has no parent directory")]
    InvalidManifestPath {
        /// The offending manifest path
        path: PathBuf,
    },

    /// Version string reported by cargo is not valid semver
    #[error("Invalid version '{version}' for package '{package}': {source}")]
    InvalidVersion {
        /// Package that reported the version
        package: String,
        /// The version string
        version: String,
        /// Underlying semver error
        #[source]
        source: semver::Error,
    },
}

/// Errors from running cargo
#[derive(Error, Debug)]
pub enum CargoError {
    /// No cargo executable could be located
    #[error("Could not locate the cargo executable: {reason}")]
    CargoNotFound {
        /// Why lookup failed
        reason: String,
    },

    /// The child process could not be started
    #[error("Failed to execute '{command}': {source}")]
    SpawnFailed {
        /// Rendered command line
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The child process ran longer than the configured timeout
    #[error("'{command}' timed out after {}s", .timeout.as_secs())]
    TimedOut {
        /// Rendered command line
        command: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// `cargo publish --dry-run` failed
    #[error("Dry run validation failed for '{package}': {reason}")]
    DryRunFailed {
        /// Package that failed validation
        package: String,
        /// Captured stderr
        reason: String,
    },

    /// `cargo publish` failed
    #[error("Cargo publish failed for '{package}': {reason}")]
    PublishFailed {
        /// Package that failed to publish
        package: String,
        /// Captured stderr
        reason: String,
    },

    /// The registry already has this version
    #[error("Package '{package}' version '{version}' is already published")]
    AlreadyPublished {
        /// Package name
        package: String,
        /// Version that is already on the registry
        version: String,
    },

    /// The registry rejected our credentials
    #[error("Authentication error: please ensure you're logged in with 'cargo login'")]
    AuthenticationError,
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested config file does not exist
    #[error("Config file not found: {path}")]
    NotFound {
        /// Requested path
        path: PathBuf,
    },

    /// Config file is not valid TOML for our schema
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Config file parsed but a value is out of range
    #[error("Invalid value for '{key}' in {path}: {reason}")]
    InvalidValue {
        /// File holding the value
        path: PathBuf,
        /// Offending key
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for invalid arguments
        reason: String,
    },

    /// Reading the operator's answer failed
    #[error("Prompt failed: {reason}")]
    PromptFailed {
        /// Reason for the failure
        reason: String,
    },
}

impl PublishAllError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PublishAllError::Workspace(WorkspaceError::MetadataFailed { .. }) => vec![
                "Run from within a Cargo workspace or pass --manifest-path".to_string(),
                "Check that 'cargo metadata --no-deps' succeeds on its own".to_string(),
            ],
            PublishAllError::Workspace(WorkspaceError::PackageNotFound { .. }) => vec![
                "Run 'workspace_publish list' to see the local packages".to_string(),
            ],
            PublishAllError::Cargo(CargoError::CargoNotFound { .. }) => vec![
                "Install Rust via rustup or add cargo to PATH".to_string(),
                "Set the CARGO environment variable to the cargo binary".to_string(),
            ],
            PublishAllError::Cargo(CargoError::AuthenticationError) => vec![
                "Login to the registry: cargo login".to_string(),
                "Verify API token is valid and has publish permissions".to_string(),
            ],
            PublishAllError::Cargo(CargoError::AlreadyPublished { package, .. }) => vec![
                format!("Bump the version of '{}' before publishing again", package),
                format!("Use --exclude {} to skip it", package),
            ],
            PublishAllError::Cargo(CargoError::DryRunFailed { .. }) => vec![
                "Fix the reported problem and re-run; nothing was uploaded".to_string(),
                "Use --allow-dirty if uncommitted changes are expected".to_string(),
            ],
            PublishAllError::Cargo(CargoError::TimedOut { .. }) => vec![
                "Increase the limit with --timeout".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}
