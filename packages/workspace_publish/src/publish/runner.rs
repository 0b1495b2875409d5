//! External command execution.
//!
//! All cargo invocations go through [`CommandRunner`] so the publish loop can
//! be driven by a scripted runner in tests.

use crate::error::{CargoError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default limit for a single cargo invocation
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// A single external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<OsString>,
    /// Working directory for the child; `None` inherits ours
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Start an invocation of `program` with no arguments
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child in `dir`
    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Whether the argument list contains `arg`
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Render as a shell-like command line for messages
    pub fn display(&self) -> String {
        let mut rendered = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(&arg.to_string_lossy());
        }
        rendered
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok<S: Into<String>>(stdout: S) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output (exit code 101, like cargo) with the given stderr
    pub fn failed<S: Into<String>>(stderr: S) -> Self {
        Self {
            success: false,
            code: Some(101),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` to completion and capture its output.
    ///
    /// A non-zero exit is reported through [`CommandOutput::success`], not as
    /// an error. Errors are reserved for failing to run the command at all.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    operation_timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl ProcessRunner {
    /// Create a runner with the default timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with a custom per-command timeout
    pub fn with_timeout(operation_timeout: Duration) -> Self {
        Self { operation_timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let rendered = invocation.display();
        log::debug!(
            "running `{}` in {}",
            rendered,
            invocation
                .current_dir
                .as_deref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| ".".to_string())
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = invocation.current_dir {
            cmd.current_dir(dir);
        }

        let output = timeout(self.operation_timeout, cmd.output())
            .await
            .map_err(|_| CargoError::TimedOut {
                command: rendered.clone(),
                timeout: self.operation_timeout,
            })?
            .map_err(|source| CargoError::SpawnFailed {
                command: rendered.clone(),
                source,
            })?;

        log::debug!("`{}` exited with {}", rendered, output.status);

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Locate the cargo executable.
///
/// `CARGO` wins when set (cargo exports it to subcommands), then `PATH`.
pub fn locate_cargo() -> Result<PathBuf> {
    if let Some(cargo) = std::env::var_os("CARGO").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(cargo));
    }

    which::which("cargo").map_err(|e| {
        CargoError::CargoNotFound {
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_renders_program_and_args() {
        let invocation = Invocation::new("cargo")
            .arg("publish")
            .args(["--dry-run", "--allow-dirty"])
            .current_dir("/tmp/pkg");

        assert_eq!(invocation.display(), "cargo publish --dry-run --allow-dirty");
        assert!(invocation.has_arg("--dry-run"));
        assert!(!invocation.has_arg("--registry"));
        assert_eq!(invocation.current_dir, Some(PathBuf::from("/tmp/pkg")));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let runner = ProcessRunner::new();
        let invocation = Invocation::new("/nonexistent/definitely-not-cargo");

        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::PublishAllError::Cargo(CargoError::SpawnFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().canonicalize().unwrap();
        let before = std::env::current_dir().unwrap();

        let runner = ProcessRunner::new();
        let output = runner
            .run(&Invocation::new("pwd").current_dir(dir.path()))
            .await
            .unwrap();

        assert!(output.success);
        let reported = PathBuf::from(output.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, expected);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let runner = ProcessRunner::with_timeout(Duration::from_millis(100));
        let invocation = Invocation::new("sleep").arg("5");

        let err = runner.run(&invocation).await.unwrap_err();
        match err {
            crate::error::PublishAllError::Cargo(CargoError::TimedOut { command, timeout }) => {
                assert_eq!(command, "sleep 5");
                assert_eq!(timeout, Duration::from_millis(100));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_not_an_error() {
        let runner = ProcessRunner::new();
        let output = runner.run(&Invocation::new("false")).await.unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(1));
    }
}
