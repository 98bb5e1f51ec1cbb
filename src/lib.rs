//! Typed queries and commands over the `git` command-line tool.
//!
//! Every operation is one git invocation whose output is parsed into a typed
//! value. Invocation goes through the `CommandRunner` trait so that tests and
//! embedding applications can substitute their own runner.

pub mod config;
pub mod error;
pub mod git;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{GitError, GitResult};
pub use git::{
    AsyncRepository, CommandOutput, CommandRunner, CommitLogEntry, GitExecutor, GitVersion,
    Repository,
};
