//! Publishing orchestrator for workspace packages.
//!
//! Packages are visited one at a time in the order given. Each one is
//! validated with a dry run, then published only after the operator
//! confirms. The first failure stops the run.

use crate::error::Result;
use crate::prompt::Confirmer;
use crate::publish::{CargoPublisher, PublishResult};
use crate::workspace::PackageInfo;
use std::time::{Duration, Instant};

/// Publishing orchestrator for workspace packages
#[derive(Debug)]
pub struct Publisher {
    cargo_publisher: CargoPublisher,
    config: PublisherConfig,
}

/// Configuration for the publishing orchestrator
#[derive(Debug, Clone, Default)]
pub struct PublisherConfig {
    /// Stop after the dry run; never prompt, never publish
    pub validate_only: bool,
}

/// Progress notifications emitted while publishing
#[derive(Debug, Clone)]
pub enum PublishEvent<'a> {
    /// Dry run is about to start
    Validating {
        /// Package being validated
        package: &'a PackageInfo,
        /// 1-based position in the run
        index: usize,
        /// Number of packages in the run
        total: usize,
    },
    /// Dry run succeeded
    Validated(&'a PublishResult),
    /// Operator agreed; the real publish is about to start
    Publishing(&'a PackageInfo),
    /// Real publish succeeded
    Published(&'a PublishResult),
    /// Operator declined; nothing was uploaded for this package
    Declined(&'a PackageInfo),
}

/// Result of a complete publishing run
#[derive(Debug, Clone, Default)]
pub struct PublishingResult {
    /// Dry-run results, one per visited package
    pub validated: Vec<PublishResult>,
    /// Packages that were actually published
    pub published: Vec<PublishResult>,
    /// Packages the operator chose not to publish
    pub declined: Vec<String>,
    /// Total duration of the run
    pub total_duration: Duration,
}

impl Publisher {
    /// Create a publisher with default configuration
    pub fn new(cargo_publisher: CargoPublisher) -> Self {
        Self::with_config(cargo_publisher, PublisherConfig::default())
    }

    /// Create a publisher with custom configuration
    pub fn with_config(cargo_publisher: CargoPublisher, config: PublisherConfig) -> Self {
        Self {
            cargo_publisher,
            config,
        }
    }

    /// Validate, and with confirmation publish, every package in order.
    ///
    /// Returns the first error encountered; packages after it are not
    /// touched.
    pub async fn publish_all<C, F>(
        &self,
        packages: &[PackageInfo],
        confirmer: &mut C,
        mut on_event: F,
    ) -> Result<PublishingResult>
    where
        C: Confirmer + ?Sized,
        F: FnMut(&PublishEvent<'_>),
    {
        let start_time = Instant::now();
        let mut result = PublishingResult::default();
        let total = packages.len();

        for (position, package) in packages.iter().enumerate() {
            on_event(&PublishEvent::Validating {
                package,
                index: position + 1,
                total,
            });

            let validation = self.cargo_publisher.validate_package_dry_run(package).await?;
            on_event(&PublishEvent::Validated(&validation));
            result.validated.push(validation);

            if self.config.validate_only {
                continue;
            }

            let question = format!("Publish {} {}?", package.name, package.version);
            if !confirmer.confirm(&question)? {
                log::info!("operator declined publishing {}", package.name);
                on_event(&PublishEvent::Declined(package));
                result.declined.push(package.name.clone());
                continue;
            }

            on_event(&PublishEvent::Publishing(package));
            let published = self.cargo_publisher.publish_package(package).await?;
            on_event(&PublishEvent::Published(&published));
            result.published.push(published);
        }

        result.total_duration = start_time.elapsed();
        Ok(result)
    }
}

impl PublishingResult {
    /// One-line summary of the run
    pub fn summary(&self) -> String {
        format!(
            "{} validated, {} published, {} declined in {:.2}s",
            self.validated.len(),
            self.published.len(),
            self.declined.len(),
            self.total_duration.as_secs_f64()
        )
    }

    /// Names of published packages, in order
    pub fn published_names(&self) -> Vec<&str> {
        self.published.iter().map(|r| r.package_name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CargoError, PublishAllError};
    use crate::prompt::AssumeYes;
    use crate::publish::testing::{ScriptedConfirmer, ScriptedRunner};
    use crate::publish::{CommandOutput, PublishConfig};
    use semver::Version;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn packages(names: &[&str]) -> Vec<PackageInfo> {
        names
            .iter()
            .map(|name| {
                PackageInfo::new(
                    *name,
                    Version::new(0, 1, 0),
                    PathBuf::from(format!("/ws/{}/Cargo.toml", name)),
                )
                .unwrap()
            })
            .collect()
    }

    fn publisher(runner: &Arc<ScriptedRunner>, validate_only: bool) -> Publisher {
        let cargo = CargoPublisher::new("cargo", runner.clone(), PublishConfig::default());
        Publisher::with_config(cargo, PublisherConfig { validate_only })
    }

    #[tokio::test]
    async fn publishes_only_confirmed_packages() {
        let runner = Arc::new(ScriptedRunner::new());
        let mut confirmer = ScriptedConfirmer::new(&[true, false]);

        let result = publisher(&runner, false)
            .publish_all(&packages(&["rivus-utils", "rivus-core"]), &mut confirmer, |_| {})
            .await
            .unwrap();

        assert_eq!(result.validated.len(), 2);
        assert_eq!(result.published_names(), vec!["rivus-utils"]);
        assert_eq!(result.declined, vec!["rivus-core"]);
        assert_eq!(
            confirmer.questions(),
            &["Publish rivus-utils 0.1.0?", "Publish rivus-core 0.1.0?"]
        );

        let calls: Vec<_> = runner
            .calls()
            .iter()
            .map(|c| (c.current_dir.clone().unwrap(), c.has_arg("--dry-run")))
            .collect();
        assert_eq!(
            calls,
            vec![
                (PathBuf::from("/ws/rivus-utils"), true),
                (PathBuf::from("/ws/rivus-utils"), false),
                (PathBuf::from("/ws/rivus-core"), true),
            ]
        );
    }

    #[tokio::test]
    async fn declining_everything_never_publishes() {
        let runner = Arc::new(ScriptedRunner::new());
        let mut confirmer = ScriptedConfirmer::new(&[false, false, false]);

        let result = publisher(&runner, false)
            .publish_all(
                &packages(&["rivus-log", "rivus-logger", "rivus-yaml"]),
                &mut confirmer,
                |_| {},
            )
            .await
            .unwrap();

        assert!(result.published.is_empty());
        assert!(runner.calls().iter().all(|c| c.has_arg("--dry-run")));
    }

    #[tokio::test]
    async fn failed_validation_stops_the_run() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(CommandOutput::ok(""));
        runner.push(CommandOutput::failed("error: failed to verify package tarball"));
        let mut confirmer = AssumeYes;

        let err = publisher(&runner, true)
            .publish_all(
                &packages(&["rivus-sqlx-macros", "rivus-sqlx", "rivus-db"]),
                &mut confirmer,
                |_| {},
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishAllError::Cargo(CargoError::DryRunFailed { ref package, .. }) if package == "rivus-sqlx"
        ));
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn failed_publish_stops_the_run() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(CommandOutput::ok(""));
        runner.push(CommandOutput::failed("error: 500 Internal Server Error"));

        let err = publisher(&runner, false)
            .publish_all(&packages(&["rivus-web", "rivus-ws"]), &mut AssumeYes, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishAllError::Cargo(CargoError::PublishFailed { ref package, .. }) if package == "rivus-web"
        ));
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn validate_only_never_prompts() {
        let runner = Arc::new(ScriptedRunner::new());
        let mut confirmer = ScriptedConfirmer::new(&[]);
        let mut events = Vec::new();

        let result = publisher(&runner, true)
            .publish_all(&packages(&["atlas-utils", "rivus-core"]), &mut confirmer, |event| {
                events.push(match event {
                    PublishEvent::Validating { package, index, total } => {
                        format!("validating {} {}/{}", package.name, index, total)
                    }
                    PublishEvent::Validated(r) => format!("validated {}", r.package_name),
                    other => format!("unexpected {:?}", other),
                })
            })
            .await
            .unwrap();

        assert!(confirmer.questions().is_empty());
        assert!(result.published.is_empty() && result.declined.is_empty());
        assert_eq!(
            events,
            vec![
                "validating atlas-utils 1/2",
                "validated atlas-utils",
                "validating rivus-core 2/2",
                "validated rivus-core",
            ]
        );
    }

    #[tokio::test]
    async fn working_directory_is_untouched() {
        let before = std::env::current_dir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(CommandOutput::ok(""));
        runner.push(CommandOutput::failed("error: boom"));

        let _ = publisher(&runner, false)
            .publish_all(&packages(&["rivus-core"]), &mut AssumeYes, |_| {})
            .await;

        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
