use crate::config::Config;
use crate::error::{GitError, GitResult};
use crate::git::parser::CommitLogEntry;
use crate::git::repository::Repository;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Awaitable front end for `Repository`.
///
/// Each call runs on tokio's blocking pool. Calls made through one handle and
/// its clones are serialized, so a commit never interleaves with staging from
/// another task. Handles created separately for the same path do not share
/// the lock.
///
/// When a timeout fires the caller gets `GitError::Timeout`, but the git
/// process keeps running to completion and may still change the repository;
/// later calls on the handle wait for it, within their own timeout.
#[derive(Debug, Clone)]
pub struct AsyncRepository {
    repo: Arc<Repository>,
    lock: Arc<Mutex<()>>,
    timeout: Option<Duration>,
}

impl AsyncRepository {
    /// Wrap a repository with no per-call timeout
    pub fn new(repo: Repository) -> Self {
        Self {
            repo: Arc::new(repo),
            lock: Arc::new(Mutex::new(())),
            timeout: None,
        }
    }

    /// Wrap a repository, bounding every call by `timeout`
    pub fn with_timeout(repo: Repository, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::new(repo)
        }
    }

    /// Open `path` with the binary, remote and timeout from `config`
    pub fn from_config<P: AsRef<Path>>(path: P, config: &Config) -> Self {
        Self::with_timeout(Repository::from_config(path, config), config.timeout())
    }

    /// The wrapped synchronous repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Run `f` against the repository on the blocking pool while holding
    /// this handle's lock.
    ///
    /// The timeout covers waiting for the lock as well as the call itself.
    /// The lock travels with the blocking task, so a call that timed out
    /// still holds it until git exits.
    pub async fn call<T, F>(&self, f: F) -> GitResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> GitResult<T> + Send + 'static,
    {
        let lock = Arc::clone(&self.lock);
        let repo = Arc::clone(&self.repo);
        let work = async move {
            let guard = lock.lock_owned().await;
            tokio::task::spawn_blocking(move || {
                let _guard = guard;
                f(&repo)
            })
            .await
        };

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(joined) => joined,
                Err(_) => {
                    log::warn!(
                        "git call in {} exceeded {:?}",
                        self.repo.path().display(),
                        limit
                    );
                    return Err(GitError::Timeout(limit));
                }
            },
            None => work.await,
        };

        joined.map_err(|e| GitError::TaskFailed(e.to_string()))?
    }

    pub async fn branch_name(&self) -> GitResult<String> {
        self.call(|repo| repo.branch_name()).await
    }

    pub async fn commit_hash(&self, short: bool) -> GitResult<String> {
        self.call(move |repo| repo.commit_hash(short)).await
    }

    pub async fn commit_date(&self) -> GitResult<DateTime<Utc>> {
        self.call(|repo| repo.commit_date()).await
    }

    pub async fn commit_count(&self) -> GitResult<u64> {
        self.call(|repo| repo.commit_count()).await
    }

    pub async fn message(&self) -> GitResult<String> {
        self.call(|repo| repo.message()).await
    }

    pub async fn is_dirty(&self) -> GitResult<bool> {
        self.call(|repo| repo.is_dirty()).await
    }

    pub async fn log(&self, limit: Option<usize>) -> GitResult<Vec<CommitLogEntry>> {
        self.call(move |repo| repo.log(limit)).await
    }

    pub async fn log_n1(&self, format: &str) -> GitResult<String> {
        let format = format.to_string();
        self.call(move |repo| repo.log_n1(&format)).await
    }

    pub async fn add_all(&self) -> GitResult<()> {
        self.call(|repo| repo.add_all()).await
    }

    pub async fn commit(&self, message: &str) -> GitResult<()> {
        let message = message.to_string();
        self.call(move |repo| repo.commit(&message)).await
    }

    pub async fn create_branch(&self, name: &str) -> GitResult<()> {
        let name = name.to_string();
        self.call(move |repo| repo.create_branch(&name)).await
    }

    pub async fn checkout_branch(&self, name: &str) -> GitResult<()> {
        let name = name.to_string();
        self.call(move |repo| repo.checkout_branch(&name)).await
    }

    pub async fn delete_branch(&self, name: &str) -> GitResult<()> {
        let name = name.to_string();
        self.call(move |repo| repo.delete_branch(&name)).await
    }

    pub async fn create_tag(&self, name: &str) -> GitResult<()> {
        let name = name.to_string();
        self.call(move |repo| repo.create_tag(&name)).await
    }

    pub async fn tag(
        &self,
        sort_by_creation_date: bool,
        reverse: bool,
        pattern: Option<&str>,
    ) -> GitResult<Option<String>> {
        let pattern = pattern.map(str::to_string);
        self.call(move |repo| repo.tag(sort_by_creation_date, reverse, pattern.as_deref()))
            .await
    }

    pub async fn create_remote_branch(&self, name: &str) -> GitResult<()> {
        let name = name.to_string();
        self.call(move |repo| repo.create_remote_branch(&name)).await
    }

    pub async fn delete_remote_branch(&self, name: &str) -> GitResult<()> {
        let name = name.to_string();
        self.call(move |repo| repo.delete_remote_branch(&name)).await
    }

    pub async fn fetch(&self) -> GitResult<()> {
        self.call(|repo| repo.fetch()).await
    }

    pub async fn remote_url(&self) -> GitResult<String> {
        self.call(|repo| repo.remote_url()).await
    }

    pub async fn repository_name(&self) -> GitResult<String> {
        self.call(|repo| repo.repository_name()).await
    }

    pub async fn is_up_to_date(&self) -> GitResult<bool> {
        self.call(|repo| repo.is_up_to_date()).await
    }
}

impl From<Repository> for AsyncRepository {
    fn from(repo: Repository) -> Self {
        Self::new(repo)
    }
}
