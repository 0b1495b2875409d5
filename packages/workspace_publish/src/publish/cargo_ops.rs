//! Cargo publish operations for a single package.
//!
//! Each package is validated with `cargo publish --dry-run` and, once the
//! operator agrees, published with plain `cargo publish`. Both run with the
//! package directory as the child's working directory.

use crate::error::{CargoError, Result};
use crate::publish::runner::{CommandOutput, CommandRunner, Invocation};
use crate::workspace::PackageInfo;
use semver::Version;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a cargo publish operation
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Package name that was validated or published
    pub package_name: String,
    /// Version that was validated or published
    pub version: Version,
    /// Duration of the cargo invocation
    pub duration: Duration,
    /// Any warnings from cargo publish
    pub warnings: Vec<String>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

/// Configuration for publishing operations
#[derive(Debug, Clone, Default)]
pub struct PublishConfig {
    /// Registry to publish to (defaults to crates.io)
    pub registry: Option<String>,
    /// Whether to allow dirty working directory
    pub allow_dirty: bool,
    /// Additional cargo publish arguments
    pub additional_args: Vec<String>,
}

/// Runs cargo publish for individual packages
#[derive(Clone)]
pub struct CargoPublisher {
    cargo: PathBuf,
    runner: Arc<dyn CommandRunner>,
    config: PublishConfig,
}

impl std::fmt::Debug for CargoPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CargoPublisher")
            .field("cargo", &self.cargo)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CargoPublisher {
    /// Create a publisher that invokes `cargo` through `runner`
    pub fn new<P: Into<PathBuf>>(
        cargo: P,
        runner: Arc<dyn CommandRunner>,
        config: PublishConfig,
    ) -> Self {
        Self {
            cargo: cargo.into(),
            runner,
            config,
        }
    }

    /// Perform dry run validation of a package
    pub async fn validate_package_dry_run(&self, package_info: &PackageInfo) -> Result<PublishResult> {
        let start_time = Instant::now();
        let invocation = self.build_publish_command(package_info, true);

        let output = self.runner.run(&invocation).await?;
        if !output.success {
            return Err(self.classify_failure(package_info, &output, true).into());
        }

        Ok(PublishResult {
            package_name: package_info.name.clone(),
            version: package_info.version.clone(),
            duration: start_time.elapsed(),
            warnings: extract_warnings(&output),
            dry_run: true,
        })
    }

    /// Publish a package to the registry
    pub async fn publish_package(&self, package_info: &PackageInfo) -> Result<PublishResult> {
        let start_time = Instant::now();
        let invocation = self.build_publish_command(package_info, false);

        let output = self.runner.run(&invocation).await?;
        if !output.success {
            return Err(self.classify_failure(package_info, &output, false).into());
        }

        Ok(PublishResult {
            package_name: package_info.name.clone(),
            version: package_info.version.clone(),
            duration: start_time.elapsed(),
            warnings: extract_warnings(&output),
            dry_run: false,
        })
    }

    /// Build the cargo publish invocation for a package
    pub fn build_publish_command(&self, package_info: &PackageInfo, dry_run: bool) -> Invocation {
        let mut invocation = Invocation::new(&self.cargo)
            .arg("publish")
            .current_dir(&package_info.directory);

        if dry_run {
            invocation = invocation.arg("--dry-run");
        }

        if let Some(ref registry) = self.config.registry {
            invocation = invocation.arg("--registry").arg(registry);
        }

        if self.config.allow_dirty {
            invocation = invocation.arg("--allow-dirty");
        }

        invocation.args(self.config.additional_args.iter().cloned())
    }

    fn classify_failure(
        &self,
        package_info: &PackageInfo,
        output: &CommandOutput,
        dry_run: bool,
    ) -> CargoError {
        let stderr = output.stderr.trim().to_string();
        let lowered = stderr.to_lowercase();

        if lowered.contains("already exists") || lowered.contains("already uploaded") {
            return CargoError::AlreadyPublished {
                package: package_info.name.clone(),
                version: package_info.version.to_string(),
            };
        }

        if !dry_run && (lowered.contains("unauthorized") || lowered.contains("no token found")) {
            return CargoError::AuthenticationError;
        }

        if dry_run {
            CargoError::DryRunFailed {
                package: package_info.name.clone(),
                reason: stderr,
            }
        } else {
            CargoError::PublishFailed {
                package: package_info.name.clone(),
                reason: stderr,
            }
        }
    }
}

/// Extract warnings from cargo output
fn extract_warnings(output: &CommandOutput) -> Vec<String> {
    output
        .stdout
        .lines()
        .chain(output.stderr.lines())
        .filter(|line| line.trim_start().starts_with("warning:"))
        .map(|line| line.trim().to_string())
        .collect()
}

impl PublishResult {
    /// Get a summary of the publish operation
    pub fn summary(&self) -> String {
        let status = if self.dry_run { "validated" } else { "published" };
        format!(
            "{} {}@{} in {:.2}s",
            status,
            self.package_name,
            self.version,
            self.duration.as_secs_f64(),
        )
    }

    /// Format detailed report
    pub fn format_report(&self) -> String {
        let mut report = self.summary();

        if !self.warnings.is_empty() {
            report.push_str("\nWarnings:");
            for warning in &self.warnings {
                report.push_str(&format!("\n  - {}", warning));
            }
        }

        report
    }
}
