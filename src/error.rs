use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("Failed to initialize repository: {0}")]
    Initialization(String),

    #[error("HEAD is detached; no branch is checked out")]
    DetachedHead,

    #[error("Repository has no commits yet")]
    NoCommits,

    #[error("Nothing to commit: {0}")]
    NothingToCommit(String),

    #[error("Cannot delete branch '{0}' while it is checked out")]
    CannotDeleteCurrentBranch(String),

    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),

    #[error("No such remote: {0}")]
    RemoteNotFound(String),

    #[error("'{0}' is not a valid branch, tag or remote name")]
    InvalidName(String),

    #[error("Branch '{0}' has no upstream tracking branch")]
    NoUpstream(String),

    #[error("Command 'git {command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("Git version {0} is too old. Minimum required: 2.20")]
    GitVersionTooOld(String),

    #[error("Failed to detect git version: {0}")]
    GitVersionDetectionFailed(String),

    #[error("Git command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Background git task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;
