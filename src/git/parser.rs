use crate::error::{GitError, GitResult};
use crate::git::executor::CommandOutput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field separator placed between log fields by the format strings we pass to git
pub const FIELD_SEPARATOR: char = '\0';

/// Format string for `git log` producing one `CommitLogEntry` per line
pub const LOG_FORMAT: &str = "--format=%cI%x00%H%x00%an%x00%s";

/// Parse the output of `git rev-parse [--short] HEAD`
pub fn parse_commit_hash(output: &str, short: bool) -> GitResult<String> {
    let hash = output.trim();

    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GitError::ParseError(format!(
            "Expected a hexadecimal commit hash, got '{}'",
            hash
        )));
    }

    // SHA-1 repositories use 40 hex digits, SHA-256 repositories 64
    let valid_length = if short {
        (4..=64).contains(&hash.len())
    } else {
        hash.len() == 40 || hash.len() == 64
    };

    if !valid_length {
        return Err(GitError::ParseError(format!(
            "Unexpected commit hash length {}: '{}'",
            hash.len(),
            hash
        )));
    }

    Ok(hash.to_string())
}

/// Parse a strict ISO 8601 date (`%cI`) and normalize it to UTC
pub fn parse_commit_date(output: &str) -> GitResult<DateTime<Utc>> {
    let text = output.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| GitError::ParseError(format!("Invalid commit date '{}': {}", text, e)))
}

/// Parse a single non-negative integer such as `git rev-list --count` output
pub fn parse_count(output: &str) -> GitResult<u64> {
    let text = output.trim();
    text.parse::<u64>()
        .map_err(|_| GitError::ParseError(format!("Expected a count, got '{}'", text)))
}

/// Parse git log output produced with `LOG_FORMAT`
pub fn parse_log(output: &str) -> GitResult<Vec<CommitLogEntry>> {
    let mut commits = Vec::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.splitn(4, FIELD_SEPARATOR).collect();
        if parts.len() != 4 {
            return Err(GitError::ParseError(format!(
                "Expected 4 log fields, found {} in '{}'",
                parts.len(),
                line.replace(FIELD_SEPARATOR, "\\0")
            )));
        }

        commits.push(CommitLogEntry {
            date: parse_commit_date(parts[0])?,
            hash: parse_commit_hash(parts[1], false)?,
            name: parts[2].to_string(),
            subject: parts[3].to_string(),
        });
    }

    Ok(commits)
}

/// Parse git status --porcelain=v2 output
pub fn parse_status_porcelain_v2(output: &str) -> GitResult<Vec<StatusEntry>> {
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let kind = line.split(' ').next().unwrap_or_default();
        let (xy, path) = match kind {
            // 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
            "1" => tracked_fields(line, 9, 8)?,
            // 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path><tab><origPath>
            "2" => {
                let (xy, paths) = tracked_fields(line, 10, 9)?;
                let path = paths.split('\t').next().unwrap_or_default().to_string();
                (xy, path)
            }
            // u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
            "u" => {
                let (_, path) = tracked_fields(line, 11, 10)?;
                entries.push(StatusEntry {
                    status: FileStatus::Unmerged,
                    path,
                    staged: true,
                    unstaged: true,
                });
                continue;
            }
            "?" | "!" => {
                let path = line.get(2..).unwrap_or_default();
                if path.is_empty() {
                    return Err(GitError::ParseError(format!(
                        "Missing path in status line '{}'",
                        line
                    )));
                }
                let status = if kind == "?" {
                    FileStatus::Untracked
                } else {
                    FileStatus::Ignored
                };
                entries.push(StatusEntry {
                    status,
                    path: path.to_string(),
                    staged: false,
                    unstaged: false,
                });
                continue;
            }
            other => {
                return Err(GitError::ParseError(format!(
                    "Unknown status record type '{}' in '{}'",
                    other, line
                )));
            }
        };

        let mut codes = xy.chars();
        let index = codes.next().unwrap_or('.');
        let worktree = codes.next().unwrap_or('.');
        let significant = if index != '.' { index } else { worktree };

        entries.push(StatusEntry {
            status: FileStatus::from_code(significant),
            path,
            staged: index != '.',
            unstaged: worktree != '.',
        });
    }

    Ok(entries)
}

/// Split a tracked-entry status line into its XY code and trailing path field
fn tracked_fields(
    line: &str,
    field_count: usize,
    path_index: usize,
) -> GitResult<(String, String)> {
    let parts: Vec<&str> = line.splitn(field_count, ' ').collect();
    if parts.len() != field_count || parts[1].len() != 2 {
        return Err(GitError::ParseError(format!(
            "Malformed status line '{}'",
            line
        )));
    }

    Ok((parts[1].to_string(), parts[path_index].to_string()))
}

/// Parse `git tag --list` output, preserving git's ordering
pub fn parse_tag_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derive a short repository name from a remote URL.
///
/// Handles https, ssh, scp-like (`git@host:owner/repo.git`) and local path
/// remotes: the last path segment with any `.git` suffix removed.
pub fn parse_repository_name(url: &str) -> GitResult<String> {
    let trimmed = url.trim().trim_end_matches(['/', '\\']);
    let segment = trimmed
        .rsplit(['/', ':', '\\'])
        .next()
        .unwrap_or_default();
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() {
        return Err(GitError::ParseError(format!(
            "Cannot derive a repository name from '{}'",
            url
        )));
    }

    Ok(name.to_string())
}

/// Map a failed git invocation to a typed error.
///
/// Matching is done on git's English diagnostics, which are stable across
/// the supported versions. Anything unrecognized becomes `CommandFailed`
/// carrying the raw stderr.
pub fn classify_failure(args: &[&str], output: &CommandOutput, repo_path: &Path) -> GitError {
    let stderr = output.stderr.trim();
    let combined = format!("{}\n{}", output.stderr, output.stdout);
    // ASCII lowercasing keeps byte offsets aligned with `combined`
    let lower = combined.to_ascii_lowercase();
    let subcommand = args.first().copied().unwrap_or_default();

    log::trace!(
        "classifying failure of 'git {}' (exit {})",
        args.join(" "),
        output.exit_code
    );

    if lower.contains("not a git repository") || lower.contains("cannot change to") {
        return GitError::NotARepository(repo_path.to_path_buf());
    }

    if lower.contains("no such remote") {
        let name = quoted_after(&combined, &lower, "no such remote")
            .or_else(|| args.get(2).map(|s| s.to_string()))
            .unwrap_or_default();
        return GitError::RemoteNotFound(name);
    }

    if matches!(subcommand, "push" | "fetch" | "pull" | "ls-remote") {
        return GitError::RemoteOperation(first_non_empty(stderr, &output.stdout));
    }

    if lower.contains("nothing to commit")
        || lower.contains("nothing added to commit")
        || lower.contains("no changes added to commit")
    {
        let reason = combined
            .lines()
            .map(str::trim)
            .find(|line| {
                let line = line.to_ascii_lowercase();
                line.contains("nothing") || line.contains("no changes added")
            })
            .unwrap_or_default();
        return GitError::NothingToCommit(reason.to_string());
    }

    if lower.contains("no upstream configured for branch") || lower.contains("no upstream branch")
    {
        let branch = quoted_after(&combined, &lower, "no upstream configured for branch")
            .unwrap_or_default();
        return GitError::NoUpstream(branch);
    }

    if lower.contains("cannot delete branch")
        && (lower.contains("checked out") || lower.contains("used by worktree"))
    {
        let branch = quoted_after(&combined, &lower, "cannot delete branch")
            .or_else(|| args.last().map(|s| s.to_string()))
            .unwrap_or_default();
        return GitError::CannotDeleteCurrentBranch(branch);
    }

    if lower.contains("does not have any commits yet")
        || lower.contains("ambiguous argument 'head'")
        || lower.contains("bad default revision 'head'")
        || lower.contains("not a valid object name head")
        || lower.contains("needed a single revision")
    {
        return GitError::NoCommits;
    }

    GitError::CommandFailed {
        command: args.join(" "),
        exit_code: output.exit_code,
        stderr: stderr.to_string(),
    }
}

/// Find the first single-quoted value following `marker`
fn quoted_after(original: &str, lower: &str, marker: &str) -> Option<String> {
    let start = lower.find(marker)? + marker.len();
    let rest = &original[start..];
    let open = rest.find('\'')? + 1;
    let close = rest[open..].find('\'')? + open;
    Some(rest[open..close].to_string())
}

fn first_non_empty(primary: &str, fallback: &str) -> String {
    let primary = primary.trim();
    if primary.is_empty() {
        fallback.trim().lines().next().unwrap_or_default().to_string()
    } else {
        primary.lines().next().unwrap_or_default().to_string()
    }
}

/// Represents a file status entry from git status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub status: FileStatus,
    pub path: String,
    pub staged: bool,
    pub unstaged: bool,
}

impl StatusEntry {
    /// Whether the entry describes a file git already tracks
    pub fn is_tracked(&self) -> bool {
        !matches!(self.status, FileStatus::Untracked | FileStatus::Ignored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Unmerged,
    Untracked,
    Ignored,
    Unknown,
}

impl FileStatus {
    fn from_code(code: char) -> Self {
        match code {
            'M' => FileStatus::Modified,
            'A' => FileStatus::Added,
            'D' => FileStatus::Deleted,
            'R' => FileStatus::Renamed,
            'C' => FileStatus::Copied,
            'T' => FileStatus::TypeChanged,
            'U' => FileStatus::Unmerged,
            _ => FileStatus::Unknown,
        }
    }
}

/// One commit from git log, newest first in the order git reports them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitLogEntry {
    pub date: DateTime<Utc>,
    pub hash: String,
    pub name: String,
    pub subject: String,
}
