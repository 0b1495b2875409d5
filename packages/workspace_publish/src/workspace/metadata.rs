//! The subset of `cargo metadata --format-version 1` output we read.

use crate::error::{Result, WorkspaceError};
use crate::publish::{CommandRunner, Invocation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level `cargo metadata` document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMetadata {
    /// Packages reported by cargo, in cargo's order
    pub packages: Vec<MetadataPackage>,
    /// Root directory of the workspace
    pub workspace_root: PathBuf,
}

/// One entry of the `packages` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataPackage {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Absolute path to the package's Cargo.toml
    pub manifest_path: PathBuf,
    /// Where the package comes from; `None` for local path packages
    #[serde(default)]
    pub source: Option<String>,
    /// Registries the package may be published to; `None` means any
    #[serde(default)]
    pub publish: Option<Vec<String>>,
}

impl MetadataPackage {
    /// Whether this package lives in the workspace rather than a registry or git
    pub fn is_local(&self) -> bool {
        self.source.is_none()
    }
}

impl WorkspaceMetadata {
    /// Build the metadata query for an optional manifest path
    pub fn command(cargo: &Path, manifest_path: Option<&Path>) -> Invocation {
        let mut invocation = Invocation::new(cargo)
            .arg("metadata")
            .arg("--format-version")
            .arg("1")
            .arg("--no-deps");

        if let Some(manifest) = manifest_path {
            invocation = invocation.arg("--manifest-path").arg(manifest);
        }

        invocation
    }

    /// Run `cargo metadata` and parse its output
    pub async fn query(
        runner: &dyn CommandRunner,
        cargo: &Path,
        manifest_path: Option<&Path>,
    ) -> Result<Self> {
        let invocation = Self::command(cargo, manifest_path);
        let output = runner.run(&invocation).await?;

        if !output.success {
            return Err(WorkspaceError::MetadataFailed {
                reason: output.stderr.trim().to_string(),
            }
            .into());
        }

        Self::parse(&output.stdout)
    }

    /// Parse metadata JSON
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            WorkspaceError::InvalidMetadata {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"{
        "packages": [
            {
                "name": "rivus-core",
                "version": "0.2.0",
                "id": "path+file:///ws/rivus-core#0.2.0",
                "source": null,
                "manifest_path": "/ws/rivus-core/Cargo.toml",
                "publish": null
            },
            {
                "name": "serde",
                "version": "1.0.210",
                "source": "registry+https://github.com/rust-lang/crates.io-index",
                "manifest_path": "/home/u/.cargo/registry/src/serde-1.0.210/Cargo.toml"
            },
            {
                "name": "rivus-internal",
                "version": "0.1.0",
                "source": null,
                "manifest_path": "/ws/rivus-internal/Cargo.toml",
                "publish": []
            }
        ],
        "workspace_members": [],
        "workspace_root": "/ws",
        "version": 1
    }"#;

    #[test]
    fn parses_packages_and_ignores_unknown_fields() {
        let metadata = WorkspaceMetadata::parse(METADATA).unwrap();

        assert_eq!(metadata.workspace_root, PathBuf::from("/ws"));
        assert_eq!(metadata.packages.len(), 3);
        assert!(metadata.packages[0].is_local());
        assert!(!metadata.packages[1].is_local());
        assert_eq!(metadata.packages[1].publish, None);
        assert_eq!(metadata.packages[2].publish, Some(Vec::new()));
    }

    #[test]
    fn rejects_garbage() {
        let err = WorkspaceMetadata::parse("not json").unwrap_err();
        assert!(err.to_string().contains("Invalid cargo metadata output"));
    }

    #[test]
    fn command_includes_manifest_path() {
        let invocation = WorkspaceMetadata::command(
            Path::new("cargo"),
            Some(Path::new("/ws/Cargo.toml")),
        );
        assert_eq!(
            invocation.display(),
            "cargo metadata --format-version 1 --no-deps --manifest-path /ws/Cargo.toml"
        );
        assert_eq!(invocation.current_dir, None);
    }
}
