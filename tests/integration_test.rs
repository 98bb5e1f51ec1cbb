mod helpers;

use chrono::Utc;
use gitrev::{GitError, GitVersion, Repository};
use helpers::{
    create_commit, create_empty_repo, create_repo_with_remote, create_test_repo, git, test_config,
    write_file,
};
use tempfile::TempDir;

#[test]
fn test_git_version_detection() {
    let version = GitVersion::detect().expect("Failed to detect git version");
    assert!(version.major >= 2);
    assert!(GitVersion::validate().is_ok());
}

#[test]
fn test_create_repository() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("testRepo");

    let repo = Repository::create(&path).expect("Failed to create repository");

    assert!(path.is_dir());
    assert!(path.join(".git").exists());
    assert_eq!(repo.path(), path.as_path());
}

#[test]
fn test_create_with_config_writes_identity() {
    let (_temp, repo) = create_empty_repo();

    assert_eq!(git(repo.path(), &["config", "user.name"]), "Test User");
    assert_eq!(git(repo.path(), &["config", "user.email"]), "test@example.com");
}

#[test]
fn test_create_in_unwritable_location() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("plain-file");
    std::fs::write(&file, "not a directory").unwrap();

    let result = Repository::create(file.join("repo"));
    assert!(matches!(result, Err(GitError::Initialization(_))));
}

#[test]
fn test_open_missing_path_fails_on_first_query() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::open(temp_dir.path().join("does-not-exist"));

    assert!(matches!(repo.commit_count(), Err(GitError::NotARepository(_))));
}

#[test]
fn test_fresh_repository_with_one_commit() {
    let (_temp, repo) = create_test_repo();

    assert_eq!(repo.commit_count().unwrap(), 1);

    let full = repo.commit_hash(false).unwrap();
    assert_eq!(full.len(), 40);
    assert!(full.chars().all(|c| c.is_ascii_hexdigit()));

    let short = repo.commit_hash(true).unwrap();
    assert!(short.len() < full.len());
    assert!(full.starts_with(&short));

    let expected_branch = git(repo.path(), &["symbolic-ref", "--short", "HEAD"]);
    assert_eq!(repo.branch_name().unwrap(), expected_branch);
}

#[test]
fn test_commit_date_is_recent() {
    let (_temp, repo) = create_test_repo();

    let now = Utc::now();
    let date = repo.commit_date().unwrap();
    assert!((now - date).num_seconds().abs() <= 2);
}

#[test]
fn test_message() {
    let (_temp, repo) = create_test_repo();
    assert_eq!(repo.message().unwrap(), "initial commit");
}

#[test]
fn test_is_dirty_toggle() {
    let (_temp, repo) = create_test_repo();
    assert!(!repo.is_dirty().unwrap());

    write_file(&repo, "README.md", "HATE");
    assert!(repo.is_dirty().unwrap());
    assert!(repo.has_unstaged_changes().unwrap());

    repo.commit("2").unwrap();
    assert!(!repo.is_dirty().unwrap());
    assert_eq!(repo.message().unwrap(), "2");
}

#[test]
fn test_staged_change_is_dirty_but_not_unstaged() {
    let (_temp, repo) = create_test_repo();

    write_file(&repo, "README.md", "STAGED");
    repo.add_all().unwrap();

    assert!(repo.is_dirty().unwrap());
    assert!(!repo.has_unstaged_changes().unwrap());
}

#[test]
fn test_untracked_file_is_not_dirty() {
    let (_temp, repo) = create_test_repo();

    write_file(&repo, "notes.txt", "scratch");
    assert!(!repo.is_dirty().unwrap());

    // add_all picks up untracked files too
    repo.add_all().unwrap();
    assert!(repo.is_dirty().unwrap());
}

#[test]
fn test_log_single_commit() {
    let (_temp, repo) = create_test_repo();

    let log = repo.log(None).unwrap();
    assert_eq!(log.len(), 1);

    let entry = &log[0];
    assert_eq!(entry.hash, repo.commit_hash(false).unwrap());
    assert_eq!(entry.name, "Test User");
    assert_eq!(entry.subject, "initial commit");
    assert!((Utc::now() - entry.date).num_seconds().abs() <= 2);
}

#[test]
fn test_log_newest_first_with_limit() {
    let (_temp, repo) = create_test_repo();
    create_commit(&repo, "a.txt", "a", "second");
    create_commit(&repo, "b.txt", "b", "third");

    let all = repo.log(None).unwrap();
    let subjects: Vec<&str> = all.iter().map(|e| e.subject.as_str()).collect();
    assert_eq!(subjects, vec!["third", "second", "initial commit"]);

    let limited = repo.log(Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].subject, "third");
}

#[test]
fn test_branch_round_trip() {
    let (_temp, repo) = create_test_repo();
    let branch = "testLocal";
    let current = repo.branch_name().unwrap();

    repo.create_branch(branch).unwrap();
    repo.checkout_branch(branch).unwrap();
    assert_eq!(repo.branch_name().unwrap(), branch);
    repo.checkout_branch(&current).unwrap();
    repo.delete_branch(branch).unwrap();

    repo.create_branch(branch).unwrap();
    repo.checkout_branch(branch).unwrap();
    repo.checkout_branch(&current).unwrap();
    repo.delete_branch(branch).unwrap();

    assert_eq!(repo.branch_name().unwrap(), current);
}

#[test]
fn test_delete_current_branch() {
    let (_temp, repo) = create_test_repo();
    let current = repo.branch_name().unwrap();

    let result = repo.delete_branch(&current);
    assert!(matches!(result, Err(GitError::CannotDeleteCurrentBranch(b)) if b == current));
    assert_eq!(repo.branch_name().unwrap(), current);
}

#[test]
fn test_checkout_missing_branch_keeps_stderr() {
    let (_temp, repo) = create_test_repo();

    match repo.checkout_branch("no-such-branch") {
        Err(GitError::CommandFailed { stderr, .. }) => assert!(!stderr.is_empty()),
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[test]
fn test_checkout_option_like_name_keeps_working_tree() {
    let (_temp, repo) = create_test_repo();
    write_file(&repo, "README.md", "HATE");

    let result = repo.checkout_branch("-f");
    assert!(matches!(result, Err(GitError::InvalidName(n)) if n == "-f"));

    assert!(repo.is_dirty().unwrap());
    let contents = std::fs::read_to_string(repo.path().join("README.md")).unwrap();
    assert_eq!(contents, "HATE");
}

#[test]
fn test_create_option_like_branch_fails() {
    let (_temp, repo) = create_test_repo();
    let before = git(repo.path(), &["branch", "--list"]);

    assert!(matches!(
        repo.create_branch("--list"),
        Err(GitError::InvalidName(_))
    ));
    assert!(matches!(repo.create_tag("-d"), Err(GitError::InvalidName(_))));
    assert_eq!(git(repo.path(), &["branch", "--list"]), before);
}

#[test]
fn test_detached_head() {
    let (_temp, repo) = create_test_repo();
    git(repo.path(), &["checkout", "--detach"]);

    assert!(matches!(repo.branch_name(), Err(GitError::DetachedHead)));
    // Queries that do not need a branch keep working
    assert_eq!(repo.commit_count().unwrap(), 1);
}

#[test]
fn test_create_tag_and_query() {
    let (_temp, repo) = create_test_repo();
    let tag_name = "v12000";

    repo.create_tag(tag_name).unwrap();
    assert_eq!(
        repo.tag(false, false, Some("v*")).unwrap().as_deref(),
        Some(tag_name)
    );
    assert_eq!(repo.tag(false, false, Some("release-*")).unwrap(), None);
}

#[test]
fn test_tag_ordering() {
    let (_temp, repo) = create_test_repo();
    repo.create_tag("v1.2").unwrap();
    repo.create_tag("v1.10").unwrap();
    repo.create_annotated_tag("v2.0", "second major").unwrap();

    assert_eq!(
        repo.tags(false, false, Some("v*")).unwrap(),
        vec!["v2.0", "v1.2", "v1.10"]
    );
    assert_eq!(
        repo.tags(false, true, Some("v*")).unwrap(),
        vec!["v1.10", "v1.2", "v2.0"]
    );
    assert_eq!(repo.tag(false, true, None).unwrap().as_deref(), Some("v1.10"));
}

#[test]
fn test_commit_after_tag() {
    let (_temp, repo) = create_test_repo();
    repo.create_tag("v12000").unwrap();
    assert!(!repo.is_tag_dirty().unwrap());

    write_file(&repo, "README.md", "SEXY");
    repo.add_all().unwrap();
    repo.commit("Shame").unwrap();

    assert_eq!(repo.log_n1("%s").unwrap(), "Shame");
    assert!(repo.is_tag_dirty().unwrap());
}

#[test]
fn test_log_n1_custom_format() {
    let (_temp, repo) = create_test_repo();

    let hash = repo.commit_hash(false).unwrap();
    assert_eq!(repo.log_n1("%H").unwrap(), hash);
    assert_eq!(repo.log_n1("%an <%ae>").unwrap(), "Test User <test@example.com>");
}

#[test]
fn test_nothing_to_commit() {
    let (_temp, repo) = create_test_repo();

    let result = repo.commit("nothing changed");
    assert!(matches!(result, Err(GitError::NothingToCommit(_))));
    assert_eq!(repo.commit_count().unwrap(), 1);
}

#[test]
fn test_empty_repository() {
    let (_temp, repo) = create_empty_repo();

    assert!(matches!(repo.commit_hash(false), Err(GitError::NoCommits)));
    assert!(matches!(repo.commit_count(), Err(GitError::NoCommits)));
    assert!(matches!(repo.commit_date(), Err(GitError::NoCommits)));
    assert!(repo.log(None).unwrap().is_empty());
    assert!(!repo.is_dirty().unwrap());
    // An unborn branch still has a name
    assert!(!repo.branch_name().unwrap().is_empty());
}

#[test]
fn test_toplevel_and_version() {
    let (_temp, repo) = create_test_repo();

    let toplevel = repo.toplevel().unwrap();
    assert_eq!(
        toplevel.canonicalize().unwrap(),
        repo.path().canonicalize().unwrap()
    );
    assert!(repo.git_version().unwrap().is_supported());
}

#[test]
fn test_config_remote_is_used() {
    let (_temp, repo) = create_repo_with_remote();
    let mut config = test_config();
    config.git.remote = "missing".to_string();

    let configured = Repository::from_config(repo.path(), &config);
    assert_eq!(configured.remote(), "missing");
    assert!(matches!(
        configured.remote_url(),
        Err(GitError::RemoteNotFound(r)) if r == "missing"
    ));
}

#[test]
fn test_remote_url_and_repository_name() {
    let (temp, repo) = create_repo_with_remote();

    let url = repo.remote_url().unwrap();
    assert_eq!(
        url,
        temp.path().join("origin-repo.git").to_str().unwrap()
    );
    assert_eq!(repo.repository_name().unwrap(), "origin-repo");
}

#[test]
fn test_remote_url_without_remote() {
    let (_temp, repo) = create_test_repo();
    assert!(matches!(
        repo.remote_url(),
        Err(GitError::RemoteNotFound(_))
    ));
}

#[test]
fn test_remote_branch_round_trip() {
    let (_temp, repo) = create_repo_with_remote();
    let branch = "testRemote";

    for _ in 0..2 {
        repo.create_remote_branch(branch).unwrap();
        assert_eq!(
            git(repo.path(), &["ls-remote", "--heads", "origin", branch]).lines().count(),
            1
        );

        repo.delete_remote_branch(branch).unwrap();
        repo.delete_branch(branch).unwrap();
        assert!(git(repo.path(), &["ls-remote", "--heads", "origin", branch]).is_empty());
    }
}

#[test]
fn test_remote_operation_failure() {
    let (temp, repo) = create_test_repo();
    let missing = temp.path().join("no-such-remote.git");
    git(repo.path(), &["remote", "add", "broken", missing.to_str().unwrap()]);

    let broken = repo.clone().with_remote("broken");
    let result = broken.create_remote_branch("topic");
    assert!(matches!(result, Err(GitError::RemoteOperation(_))));

    // Not transactional: the local branch was created before the push failed
    repo.delete_branch("topic").unwrap();
}

#[test]
fn test_is_up_to_date() {
    let (_temp, repo) = create_repo_with_remote();
    assert!(repo.is_up_to_date().unwrap());

    create_commit(&repo, "new.txt", "ahead", "local only");
    assert!(!repo.is_up_to_date().unwrap());

    git(repo.path(), &["push"]);
    repo.fetch().unwrap();
    assert!(repo.is_up_to_date().unwrap());
}

#[test]
fn test_is_up_to_date_without_upstream() {
    let (_temp, repo) = create_test_repo();
    assert!(matches!(repo.is_up_to_date(), Err(GitError::NoUpstream(_))));
}
