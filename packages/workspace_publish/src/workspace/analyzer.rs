//! Local package enumeration and selection.

use crate::error::{Result, WorkspaceError};
use crate::publish::CommandRunner;
use crate::workspace::metadata::{MetadataPackage, WorkspaceMetadata};
use semver::Version;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Registry name cargo uses for crates.io in `publish` lists
pub const CRATES_IO: &str = "crates-io";

/// Local packages of a workspace
#[derive(Debug, Clone)]
pub struct WorkspaceInfo {
    /// Root directory of the workspace
    pub root: PathBuf,
    /// Local packages, in the order cargo reported them
    pub packages: Vec<PackageInfo>,
}

/// Information about a single local package
#[derive(Debug, Clone, Serialize)]
pub struct PackageInfo {
    /// Package name
    pub name: String,
    /// Package version
    pub version: Version,
    /// Path to Cargo.toml file
    pub manifest_path: PathBuf,
    /// Directory containing the manifest
    pub directory: PathBuf,
    /// Registries the package may be published to; `None` means any
    pub publish: Option<Vec<String>>,
}

/// Which packages to visit
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Only these packages, when non-empty
    pub packages: Vec<String>,
    /// Never these packages
    pub exclude: Vec<String>,
    /// Registry the run targets; `None` is crates.io
    pub registry: Option<String>,
    /// Visit packages even when their `publish` field forbids the registry
    pub include_unpublishable: bool,
}

/// A local package that survived `--package`/`--exclude` filtering
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The package
    pub package: &'a PackageInfo,
    /// Whether its manifest allows the target registry
    pub publishable: bool,
}

/// Packages split by whether they will be visited
#[derive(Debug, Clone, Default)]
pub struct SelectedPackages {
    /// Packages to validate and possibly publish, in order
    pub selected: Vec<PackageInfo>,
    /// Packages left out because their manifest forbids publishing there
    pub unpublishable: Vec<PackageInfo>,
}

impl PackageInfo {
    /// Create package information from a name, version and manifest path
    pub fn new<S: Into<String>>(name: S, version: Version, manifest_path: PathBuf) -> Result<Self> {
        let directory = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WorkspaceError::InvalidManifestPath {
                path: manifest_path.clone(),
            })?
            .to_path_buf();

        Ok(Self {
            name: name.into(),
            version,
            manifest_path,
            directory,
            publish: None,
        })
    }

    fn from_metadata(package: &MetadataPackage) -> Result<Self> {
        let version = Version::parse(&package.version).map_err(|source| {
            WorkspaceError::InvalidVersion {
                package: package.name.clone(),
                version: package.version.clone(),
                source,
            }
        })?;

        let mut info = Self::new(package.name.clone(), version, package.manifest_path.clone())?;
        info.publish = package.publish.clone();
        Ok(info)
    }

    /// Whether the manifest allows publishing to `registry` (`None` is crates.io)
    pub fn is_publishable_to(&self, registry: Option<&str>) -> bool {
        match &self.publish {
            None => true,
            Some(allowed) => {
                let target = registry.unwrap_or(CRATES_IO);
                allowed.iter().any(|r| r == target)
            }
        }
    }
}

impl WorkspaceInfo {
    /// Query cargo for the workspace containing `manifest_path` (or the current directory)
    pub async fn query(
        runner: &dyn CommandRunner,
        cargo: &Path,
        manifest_path: Option<&Path>,
    ) -> Result<Self> {
        let metadata = WorkspaceMetadata::query(runner, cargo, manifest_path).await?;
        Self::from_metadata(&metadata)
    }

    /// Keep the local packages of a metadata document, preserving order
    pub fn from_metadata(metadata: &WorkspaceMetadata) -> Result<Self> {
        let packages = metadata
            .packages
            .iter()
            .filter(|p| p.is_local())
            .map(PackageInfo::from_metadata)
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "found {} local packages out of {} reported",
            packages.len(),
            metadata.packages.len()
        );

        Ok(Self {
            root: metadata.workspace_root.clone(),
            packages,
        })
    }

    /// Packages matching the name filters, in cargo's order, each marked
    /// with whether the run would visit it
    pub fn candidates(&self, selection: &Selection) -> Result<Vec<Candidate<'_>>> {
        for name in &selection.packages {
            if !self.has_package(name) {
                return Err(WorkspaceError::PackageNotFound { name: name.clone() }.into());
            }
        }

        let only: HashSet<&str> = selection.packages.iter().map(String::as_str).collect();
        let excluded: HashSet<&str> = selection.exclude.iter().map(String::as_str).collect();
        let registry = selection.registry.as_deref();

        let mut candidates = Vec::new();
        for package in &self.packages {
            if !only.is_empty() && !only.contains(package.name.as_str()) {
                continue;
            }
            if excluded.contains(package.name.as_str()) {
                log::debug!("excluding {}", package.name);
                continue;
            }
            candidates.push(Candidate {
                package,
                publishable: selection.include_unpublishable
                    || package.is_publishable_to(registry),
            });
        }

        Ok(candidates)
    }

    /// Apply a selection, keeping cargo's order
    pub fn select(&self, selection: &Selection) -> Result<SelectedPackages> {
        let mut result = SelectedPackages::default();
        for candidate in self.candidates(selection)? {
            if candidate.publishable {
                result.selected.push(candidate.package.clone());
            } else {
                result.unpublishable.push(candidate.package.clone());
            }
        }
        Ok(result)
    }

    /// Check if a package exists in the workspace
    pub fn has_package(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p.name == name)
    }
}
