//! Workspace discovery.
//!
//! Local packages come from `cargo metadata`; nothing here resolves the
//! dependency graph, cargo's reported order is used as is.

mod analyzer;
mod metadata;

pub use analyzer::{
    Candidate, PackageInfo, SelectedPackages, Selection, WorkspaceInfo, CRATES_IO,
};
pub use metadata::{MetadataPackage, WorkspaceMetadata};
