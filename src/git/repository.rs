use crate::config::{Config, IdentityConfig};
use crate::error::{GitError, GitResult};
use crate::git::executor::{CommandOutput, CommandRunner, GitExecutor};
use crate::git::parser::{self, CommitLogEntry, StatusEntry};
use crate::git::version::GitVersion;
use chrono::{DateTime, Utc};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A working tree bound to a command runner.
///
/// Every method is one request/response round trip to git; nothing is cached
/// between calls. The handle itself is immutable, but git is not: callers must
/// not run mutating methods concurrently against the same path (for example
/// `add_all` and `commit` from two threads). `AsyncRepository` serializes
/// calls for async callers; synchronous callers own that responsibility.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    remote: String,
    runner: Arc<dyn CommandRunner>,
}

impl Repository {
    /// Bind to the repository at `path` using the `git` found on `PATH`.
    ///
    /// Nothing is validated here; the first query on a path that is not a
    /// repository fails with `GitError::NotARepository`.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_runner(path, Arc::new(GitExecutor::new()))
    }

    /// Bind to the current working directory
    pub fn open_current_dir() -> GitResult<Self> {
        let current_dir = env::current_dir()?;
        Ok(Self::open(current_dir))
    }

    /// Bind to `path` with an explicit runner
    pub fn with_runner<P: AsRef<Path>>(path: P, runner: Arc<dyn CommandRunner>) -> Self {
        let path = path.as_ref();
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        Self {
            path,
            remote: "origin".to_string(),
            runner,
        }
    }

    /// Bind to `path` using the binary and remote from `config`
    pub fn from_config<P: AsRef<Path>>(path: P, config: &Config) -> Self {
        Self::with_runner(path, Arc::new(GitExecutor::with_binary(&config.git.binary)))
            .with_remote(&config.git.remote)
    }

    /// Use `remote` instead of "origin" for remote operations
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Create the directory if needed and initialize a repository in it
    pub fn create<P: AsRef<Path>>(path: P) -> GitResult<Self> {
        Self::create_with_config(path, &Config::default_config())
    }

    /// Like `create`, also writing the configured committer identity
    pub fn create_with_config<P: AsRef<Path>>(path: P, config: &Config) -> GitResult<Self> {
        let repo = Self::from_config(path, config);
        repo.init(config.identity.as_ref())?;
        Ok(repo)
    }

    /// Initialize version control at this handle's path.
    ///
    /// Re-running on an existing repository is harmless (git reinitializes).
    pub fn init(&self, identity: Option<&IdentityConfig>) -> GitResult<()> {
        fs::create_dir_all(&self.path).map_err(|e| {
            GitError::Initialization(format!("cannot create {}: {}", self.path.display(), e))
        })?;

        self.init_step(&["init"])?;

        if let Some(identity) = identity {
            self.init_step(&["config", "user.name", identity.name.as_str()])?;
            self.init_step(&["config", "user.email", identity.email.as_str()])?;
        }

        log::info!("Initialized repository at {}", self.path.display());
        Ok(())
    }

    fn init_step(&self, args: &[&str]) -> GitResult<()> {
        let output = self
            .runner
            .execute(&self.path, args)
            .map_err(|e| GitError::Initialization(e.to_string()))?;

        if !output.success {
            return Err(GitError::Initialization(format!(
                "git {} failed: {}",
                args.join(" "),
                output.stderr.trim()
            )));
        }

        Ok(())
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the remote used for remote operations
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Get the runner this repository invokes git through
    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    /// Run git and turn a non-zero exit into a typed error
    fn run(&self, args: &[&str]) -> GitResult<CommandOutput> {
        let output = self.runner.execute(&self.path, args)?;
        if output.success {
            Ok(output)
        } else {
            Err(parser::classify_failure(args, &output, &self.path))
        }
    }

    fn run_trimmed(&self, args: &[&str]) -> GitResult<String> {
        let output = self.run(args)?;
        Ok(output.stdout.trim().to_string())
    }

    /// Name of the checked-out branch
    pub fn branch_name(&self) -> GitResult<String> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let output = self.runner.execute(&self.path, &args)?;

        // --quiet makes a detached HEAD a silent exit 1
        if !output.success && output.exit_code == 1 && output.stderr.trim().is_empty() {
            return Err(GitError::DetachedHead);
        }
        if !output.success {
            return Err(parser::classify_failure(&args, &output, &self.path));
        }

        let branch = output.stdout.trim();
        if branch.is_empty() {
            return Err(GitError::ParseError("empty branch name".to_string()));
        }
        Ok(branch.to_string())
    }

    /// Hash of the current commit, abbreviated when `short` is set
    pub fn commit_hash(&self, short: bool) -> GitResult<String> {
        let output = if short {
            self.run(&["rev-parse", "--verify", "--short", "HEAD"])?
        } else {
            self.run(&["rev-parse", "--verify", "HEAD"])?
        };
        parser::parse_commit_hash(&output.stdout, short)
    }

    /// Committer date of the current commit in UTC
    pub fn commit_date(&self) -> GitResult<DateTime<Utc>> {
        let output = self.run(&["log", "-1", "--format=%cI"])?;
        parser::parse_commit_date(&output.stdout)
    }

    /// Number of commits reachable from HEAD
    pub fn commit_count(&self) -> GitResult<u64> {
        let output = self.run(&["rev-list", "--count", "HEAD"])?;
        parser::parse_count(&output.stdout)
    }

    /// Subject line of the current commit
    pub fn message(&self) -> GitResult<String> {
        self.run_trimmed(&["log", "-1", "--format=%s"])
    }

    fn status(&self) -> GitResult<Vec<StatusEntry>> {
        let output = self.run(&["status", "--porcelain=v2", "--untracked-files=no"])?;
        parser::parse_status_porcelain_v2(&output.stdout)
    }

    /// Whether tracked files differ from HEAD, staged or not.
    ///
    /// Untracked files do not make the tree dirty.
    pub fn is_dirty(&self) -> GitResult<bool> {
        Ok(self.status()?.iter().any(StatusEntry::is_tracked))
    }

    /// Whether tracked files have modifications that are not staged
    pub fn has_unstaged_changes(&self) -> GitResult<bool> {
        Ok(self
            .status()?
            .iter()
            .any(|entry| entry.is_tracked() && entry.unstaged))
    }

    /// Commits reachable from HEAD, newest first.
    ///
    /// A repository without commits yields an empty list.
    pub fn log(&self, limit: Option<usize>) -> GitResult<Vec<CommitLogEntry>> {
        let max_count = limit.map(|n| format!("--max-count={}", n));
        let mut args = vec!["log", parser::LOG_FORMAT];
        if let Some(max_count) = &max_count {
            args.push(max_count.as_str());
        }

        match self.run(&args) {
            Ok(output) => parser::parse_log(&output.stdout),
            Err(GitError::NoCommits) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Format the latest commit with a git pretty-format string, e.g. "%s"
    pub fn log_n1(&self, format: &str) -> GitResult<String> {
        let format_arg = format!("--format={}", format);
        self.run_trimmed(&["log", "-1", format_arg.as_str()])
    }

    /// Stage every change in the working tree, tracked and untracked
    pub fn add_all(&self) -> GitResult<()> {
        self.run(&["add", "--all"])?;
        Ok(())
    }

    /// Commit staged changes together with modifications to tracked files
    pub fn commit(&self, message: &str) -> GitResult<()> {
        self.run(&["commit", "--all", "--message", message])?;
        log::debug!("Committed '{}' in {}", message, self.path.display());
        Ok(())
    }

    /// Create a branch at HEAD without checking it out
    pub fn create_branch(&self, name: &str) -> GitResult<()> {
        let name = operand(name)?;
        self.run(&["branch", name])?;
        Ok(())
    }

    /// Check out an existing branch
    pub fn checkout_branch(&self, name: &str) -> GitResult<()> {
        let name = operand(name)?;
        // Trailing "--" keeps git from reading the name as a path
        self.run(&["checkout", name, "--"])?;
        Ok(())
    }

    /// Force-delete a local branch other than the checked-out one
    pub fn delete_branch(&self, name: &str) -> GitResult<()> {
        let name = operand(name)?;
        if let Ok(current) = self.branch_name()
            && current == name
        {
            return Err(GitError::CannotDeleteCurrentBranch(name.to_string()));
        }

        self.run(&["branch", "-D", name])?;
        Ok(())
    }

    /// Create a lightweight tag at HEAD
    pub fn create_tag(&self, name: &str) -> GitResult<()> {
        let name = operand(name)?;
        self.run(&["tag", name])?;
        Ok(())
    }

    /// Create an annotated tag at HEAD
    pub fn create_annotated_tag(&self, name: &str, message: &str) -> GitResult<()> {
        let name = operand(name)?;
        self.run(&["tag", "-a", name, "-m", message])?;
        Ok(())
    }

    /// Tags matching an optional glob, ordered by creation date or by name.
    ///
    /// Descending by default, so the newest (or greatest) tag comes first;
    /// `reverse` switches to ascending order.
    pub fn tags(
        &self,
        sort_by_creation_date: bool,
        reverse: bool,
        pattern: Option<&str>,
    ) -> GitResult<Vec<String>> {
        let key = if sort_by_creation_date {
            "creatordate"
        } else {
            "refname"
        };
        let sort = if reverse {
            format!("--sort={}", key)
        } else {
            format!("--sort=-{}", key)
        };

        let mut args = vec!["tag", "--list", sort.as_str()];
        if let Some(pattern) = pattern {
            args.push(operand(pattern)?);
        }

        let output = self.run(&args)?;
        Ok(parser::parse_tag_list(&output.stdout))
    }

    /// First tag in `tags` order, if any tag matches
    pub fn tag(
        &self,
        sort_by_creation_date: bool,
        reverse: bool,
        pattern: Option<&str>,
    ) -> GitResult<Option<String>> {
        Ok(self
            .tags(sort_by_creation_date, reverse, pattern)?
            .into_iter()
            .next())
    }

    /// Whether HEAD has moved past (or never had) a tag
    pub fn is_tag_dirty(&self) -> GitResult<bool> {
        let args = ["describe", "--tags", "--exact-match", "HEAD"];
        let output = self.runner.execute(&self.path, &args)?;
        if output.success {
            return Ok(false);
        }

        let stderr = output.stderr.to_ascii_lowercase();
        if stderr.contains("no tag exactly matches")
            || stderr.contains("no names found")
            || stderr.contains("cannot describe anything")
        {
            return Ok(true);
        }

        Err(parser::classify_failure(&args, &output, &self.path))
    }

    /// Create a local branch at HEAD and publish it to the remote with
    /// upstream tracking. The local branch stays if the push fails.
    pub fn create_remote_branch(&self, name: &str) -> GitResult<()> {
        self.create_branch(name)?;
        self.run(&["push", "--set-upstream", operand(&self.remote)?, name])?;
        log::info!("Pushed branch {} to {}", name, self.remote);
        Ok(())
    }

    /// Delete a branch on the remote; the local branch is left alone
    pub fn delete_remote_branch(&self, name: &str) -> GitResult<()> {
        let name = operand(name)?;
        self.run(&["push", operand(&self.remote)?, "--delete", name])?;
        log::info!("Deleted branch {} from {}", name, self.remote);
        Ok(())
    }

    /// Update remote-tracking refs from the remote
    pub fn fetch(&self) -> GitResult<()> {
        self.run(&["fetch", operand(&self.remote)?])?;
        Ok(())
    }

    /// Fetch URL of the configured remote
    pub fn remote_url(&self) -> GitResult<String> {
        let url = self.run_trimmed(&["remote", "get-url", operand(&self.remote)?])?;
        if url.is_empty() {
            return Err(GitError::ParseError(format!(
                "remote '{}' has an empty URL",
                self.remote
            )));
        }
        Ok(url)
    }

    /// Short repository name taken from the remote URL
    pub fn repository_name(&self) -> GitResult<String> {
        parser::parse_repository_name(&self.remote_url()?)
    }

    /// Whether HEAD and its upstream point at the same commit.
    ///
    /// Compares against the last fetched state; call `fetch` first for a
    /// fresh answer.
    pub fn is_up_to_date(&self) -> GitResult<bool> {
        let local = self.commit_hash(false)?;
        let output = self.run(&["rev-parse", "@{upstream}"])?;
        let upstream = parser::parse_commit_hash(&output.stdout, false)?;

        log::trace!("local {} upstream {}", local, upstream);
        Ok(local == upstream)
    }

    /// Root directory of the working tree
    pub fn toplevel(&self) -> GitResult<PathBuf> {
        let root = self.run_trimmed(&["rev-parse", "--show-toplevel"])?;
        if root.is_empty() {
            return Err(GitError::ParseError("empty toplevel path".to_string()));
        }
        Ok(PathBuf::from(root))
    }

    /// Version of the git this repository runs
    pub fn git_version(&self) -> GitResult<GitVersion> {
        GitVersion::detect_with(self.runner.as_ref(), &self.path)
    }
}

/// Refuse a caller-supplied name that git would parse as an option.
///
/// Ref names may not start with `-`, so nothing valid is lost.
fn operand(name: &str) -> GitResult<&str> {
    if name.starts_with('-') {
        return Err(GitError::InvalidName(name.to_string()));
    }
    Ok(name)
}
