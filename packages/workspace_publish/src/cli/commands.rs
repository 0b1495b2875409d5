//! Command execution functions.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::FileConfig;
use crate::error::Result;
use crate::prompt::{AssumeYes, Confirmer, StdinConfirmer};
use crate::publish::{
    locate_cargo, CargoPublisher, CommandRunner, ProcessRunner, PublishEvent, Publisher,
    PublisherConfig,
};
use crate::workspace::WorkspaceInfo;
use path_absolutize::Absolutize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from_args(&args);

    if let Err(e) = super::validate_args(&args) {
        config.error_println(&e.to_string());
        return Ok(e.exit_code());
    }

    let result = match &args.command {
        Command::Publish { .. } => execute_publish(&args, &config).await,
        Command::List { json } => execute_list(&args, &config, *json).await,
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));

            if config.is_verbose() {
                let suggestions = e.recovery_suggestions();
                if !suggestions.is_empty() {
                    config.println("\n💡 Recovery suggestions:");
                    for suggestion in suggestions {
                        config.println(&format!("  • {}", suggestion));
                    }
                }
            }

            Ok(e.exit_code())
        }
    }
}

/// Workspace, config and runner resolved for a run
struct Session {
    cargo: PathBuf,
    config: RuntimeConfig,
    workspace: WorkspaceInfo,
}

async fn open_session(args: &Args, initial: &RuntimeConfig) -> Result<Session> {
    let cargo = locate_cargo()?;
    initial.verbose_println(&format!("Using cargo at {}", cargo.display()));

    let manifest_path = match args.manifest_path {
        Some(ref path) => Some(path.absolutize()?.into_owned()),
        None => None,
    };

    // The config file lives in the workspace root, so this query cannot
    // use its timeout
    initial.verbose_println("Querying workspace metadata...");
    let metadata_runner = ProcessRunner::with_timeout(initial.timeout);
    let workspace =
        WorkspaceInfo::query(&metadata_runner, &cargo, manifest_path.as_deref()).await?;

    let file_config = FileConfig::discover(args.config.as_deref(), &workspace.root)?;
    let config = RuntimeConfig::merge(args, &file_config);

    Ok(Session {
        cargo,
        config,
        workspace,
    })
}

/// Execute publish command
async fn execute_publish(args: &Args, initial: &RuntimeConfig) -> Result<()> {
    let Session {
        cargo,
        config,
        workspace,
    } = open_session(args, initial).await?;

    let packages = workspace.select(&config.selection)?;
    log::debug!(
        "{} packages selected, {} not publishable",
        packages.selected.len(),
        packages.unpublishable.len()
    );

    for package in &packages.unpublishable {
        config.warning_println(&format!(
            "Skipping {}: its manifest does not allow publishing to {}",
            package.name,
            config.selection.registry.as_deref().unwrap_or("crates.io")
        ));
    }

    if packages.selected.is_empty() {
        config.println("No local packages to publish");
        return Ok(());
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::with_timeout(config.timeout));
    let cargo_publisher = CargoPublisher::new(cargo, runner, config.publish.clone());
    let publisher = Publisher::with_config(
        cargo_publisher,
        PublisherConfig {
            validate_only: config.dry_run,
        },
    );

    let mut confirmer: Box<dyn Confirmer> = if config.assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirmer::stdio())
    };

    let result = publisher
        .publish_all(&packages.selected, confirmer.as_mut(), |event| {
            report_event(&config, event)
        })
        .await?;

    config.success_println(&result.summary());
    Ok(())
}

fn report_event(config: &RuntimeConfig, event: &PublishEvent<'_>) {
    match event {
        PublishEvent::Validating {
            package,
            index,
            total,
        } => config.println(&format!(
            "📦 [{}/{}] Validating {} v{}...",
            index, total, package.name, package.version
        )),
        PublishEvent::Validated(result) => {
            config.success_println(&format!("{} passed dry run", result.package_name));
            config.verbose_println(&result.format_report());
        }
        PublishEvent::Publishing(package) => config.println(&format!(
            "🚀 Publishing {} v{}...",
            package.name, package.version
        )),
        PublishEvent::Published(result) => config.success_println(&result.summary()),
        PublishEvent::Declined(package) => {
            config.println(&format!("⏭️ Not publishing {}", package.name))
        }
    }
}

#[derive(Serialize)]
struct ListEntry<'a> {
    name: &'a str,
    version: String,
    manifest_path: &'a std::path::Path,
    publishable: bool,
}

/// Execute list command
async fn execute_list(args: &Args, initial: &RuntimeConfig, json: bool) -> Result<()> {
    let Session {
        workspace, config, ..
    } = open_session(args, initial).await?;

    let entries: Vec<ListEntry<'_>> = workspace
        .candidates(&config.selection)?
        .into_iter()
        .map(|c| ListEntry {
            name: &c.package.name,
            version: c.package.version.to_string(),
            manifest_path: &c.package.manifest_path,
            publishable: c.publishable,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let marker = if entry.publishable { "" } else { " (not publishable)" };
        println!("{} {}{}", entry.name, entry.version, marker);
    }
    config.verbose_println(&format!("{} local packages", entries.len()));

    Ok(())
}
