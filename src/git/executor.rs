use crate::error::{GitError, GitResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Result of executing a git command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

impl CommandOutput {
    /// Build an output record from an exit code and the captured streams
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            success: exit_code == 0,
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            success: output.status.success(),
        }
    }
}

/// Runs one git invocation against a working directory.
///
/// A non-zero exit is not an error at this level: the caller inspects
/// `CommandOutput::success` and decides what the failure means. Only a
/// failure to run the process at all is reported as `Err`.
pub trait CommandRunner: fmt::Debug + Send + Sync {
    /// Run git with `args` (without the leading "git") inside `cwd`
    fn execute(&self, cwd: &Path, args: &[&str]) -> GitResult<CommandOutput>;
}

/// Executes the git binary as a child process
#[derive(Debug, Clone)]
pub struct GitExecutor {
    binary: PathBuf,
}

impl GitExecutor {
    /// Create an executor that runs `git` from `PATH`
    pub fn new() -> Self {
        Self::with_binary("git")
    }

    /// Create an executor for a specific git binary
    pub fn with_binary<P: AsRef<Path>>(binary: P) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
        }
    }

    /// Get the git binary this executor runs
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for GitExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for GitExecutor {
    fn execute(&self, cwd: &Path, args: &[&str]) -> GitResult<CommandOutput> {
        if args.is_empty() {
            return Err(GitError::CommandFailed {
                command: String::new(),
                exit_code: -1,
                stderr: "Empty command".to_string(),
            });
        }

        log::debug!("git -C {} {}", cwd.display(), args.join(" "));

        // No shell is involved: every argument reaches git verbatim
        let output = Command::new(&self.binary)
            .arg("-C")
            .arg(cwd)
            .args(args)
            // Failure classification matches git's untranslated messages
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        let output = CommandOutput::from(output);
        if !output.success {
            log::debug!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.exit_code,
                output.stderr.trim()
            );
        }

        Ok(output)
    }
}
