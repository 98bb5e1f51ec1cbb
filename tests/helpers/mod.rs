#![allow(dead_code)]

use gitrev::config::IdentityConfig;
use gitrev::{CommandOutput, CommandRunner, Config, GitResult, Repository};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Configuration with a committer identity so commits work on bare CI hosts
pub fn test_config() -> Config {
    let mut config = Config::default_config();
    config.identity = Some(IdentityConfig {
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
    });
    config
}

/// Run raw git for test setup and return trimmed stdout
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .env("LC_ALL", "C")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create an empty test repository
pub fn create_empty_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::create_with_config(temp_dir.path().join("testRepo"), &test_config())
        .expect("Failed to create repository");

    // Keep user-level signing settings out of the tests
    git(repo.path(), &["config", "commit.gpgsign", "false"]);
    git(repo.path(), &["config", "tag.gpgsign", "false"]);

    (temp_dir, repo)
}

/// Helper to create a repository holding a single "initial commit"
pub fn create_test_repo() -> (TempDir, Repository) {
    let (temp_dir, repo) = create_empty_repo();
    create_commit(&repo, "README.md", "LOVE", "initial commit");
    (temp_dir, repo)
}

pub fn write_file(repo: &Repository, file: &str, content: &str) {
    fs::write(repo.path().join(file), content).expect("Failed to write file");
}

/// Helper to create a commit through the library
pub fn create_commit(repo: &Repository, file: &str, content: &str, message: &str) {
    write_file(repo, file, content);
    repo.add_all().expect("Failed to stage");
    repo.commit(message).expect("Failed to commit");
}

/// Helper to create a repository whose "origin" is a local bare repository
/// and whose current branch already tracks it
pub fn create_repo_with_remote() -> (TempDir, Repository) {
    let (temp_dir, repo) = create_test_repo();
    let remote_path = temp_dir.path().join("origin-repo.git");

    git(temp_dir.path(), &["init", "--bare", remote_path.to_str().unwrap()]);
    git(
        repo.path(),
        &["remote", "add", "origin", remote_path.to_str().unwrap()],
    );
    git(repo.path(), &["push", "--set-upstream", "origin", "HEAD"]);

    (temp_dir, repo)
}

/// Runner that answers every call with the same output after an optional
/// delay, tracking how many calls were in flight at once
#[derive(Debug)]
pub struct SlowRunner {
    output: CommandOutput,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<VecDeque<Vec<String>>>,
}

impl SlowRunner {
    pub fn new(output: CommandOutput, delay: Duration) -> Self {
        Self {
            output,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandRunner for SlowRunner {
    fn execute(&self, _cwd: &Path, args: &[&str]) -> GitResult<CommandOutput> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push_back(args.iter().map(|s| s.to_string()).collect());

        thread::sleep(self.delay);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}
