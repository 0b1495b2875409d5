//! # Workspace Publish
//!
//! Dry-run validation and operator-confirmed publishing for every crate in a
//! Cargo workspace.
//!
//! The flow is deliberately linear: ask `cargo metadata` for the workspace,
//! keep the local packages, then for each one run `cargo publish --dry-run`
//! in its directory and, after an explicit yes, `cargo publish`. The first
//! failing cargo command ends the run with exit code 1.
//!
//! ## Usage
//!
//! ```bash
//! workspace_publish publish              # validate, then prompt per package
//! workspace_publish publish --dry-run    # validate only
//! workspace_publish publish -p rivus-core --registry internal
//! workspace_publish list --json          # packages a run would visit
//! ```
//!
//! Packages are visited in the order cargo reports them. Publish order
//! between dependent crates is left to the operator (and to cargo, which
//! refuses to publish a crate whose dependencies are not on the registry).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod prompt;
pub mod publish;
pub mod workspace;

pub use cli::{Args, Command};
pub use config::FileConfig;
pub use error::{PublishAllError, Result};
pub use prompt::{AssumeYes, Confirmer, StdinConfirmer};
pub use publish::{CargoPublisher, CommandRunner, ProcessRunner, Publisher, PublishingResult};
pub use workspace::{PackageInfo, WorkspaceInfo};
