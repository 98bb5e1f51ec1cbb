use crate::error::{GitError, GitResult};
use crate::git::executor::{CommandRunner, GitExecutor};
use std::path::Path;

/// Minimum required git version
const MIN_GIT_VERSION: (u32, u32) = (2, 20);

/// Represents a git version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Detect the version of the `git` found on `PATH`
    pub fn detect() -> GitResult<Self> {
        Self::detect_with(&GitExecutor::new(), Path::new("."))
    }

    /// Detect the version reported by a specific runner
    pub fn detect_with(runner: &dyn CommandRunner, cwd: &Path) -> GitResult<Self> {
        let output = runner
            .execute(cwd, &["--version"])
            .map_err(|e| {
                GitError::GitVersionDetectionFailed(format!("Failed to execute git: {}", e))
            })?;

        if !output.success {
            return Err(GitError::GitVersionDetectionFailed(format!(
                "git --version exited with {}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }

        Self::parse(&output.stdout)
    }

    /// Parse `git --version` output such as "git version 2.39.2",
    /// "git version 2.39.2.windows.1" or "git version 2.39.3 (Apple Git-146)"
    pub fn parse(version_str: &str) -> GitResult<Self> {
        let number = version_str
            .trim()
            .strip_prefix("git version ")
            .and_then(|rest| rest.split_whitespace().next())
            .ok_or_else(|| {
                GitError::ParseError(format!(
                    "Unexpected git version format: {}",
                    version_str.trim()
                ))
            })?;

        let mut fields = number.split('.');
        let mut component = |name: &str| -> GitResult<u32> {
            let field = fields.next().unwrap_or_default();
            field.parse::<u32>().map_err(|_| {
                GitError::ParseError(format!("Invalid {} version '{}' in {}", name, field, number))
            })
        };

        let major = component("major")?;
        let minor = component("minor")?;
        // Patch may be missing or carry a vendor suffix
        let patch = component("patch").unwrap_or(0);

        Ok(Self::new(major, minor, patch))
    }

    /// Check if this version meets minimum requirements
    pub fn is_supported(&self) -> bool {
        self.major > MIN_GIT_VERSION.0
            || (self.major == MIN_GIT_VERSION.0 && self.minor >= MIN_GIT_VERSION.1)
    }

    /// Validate that the git on `PATH` is recent enough
    pub fn validate() -> GitResult<Self> {
        Self::detect()?.ensure_supported()
    }

    /// Return `self` if it meets the minimum, otherwise `GitVersionTooOld`
    pub fn ensure_supported(self) -> GitResult<Self> {
        let version = self;

        if !version.is_supported() {
            return Err(GitError::GitVersionTooOld(format!(
                "{}.{}.{} (upgrade git to {}.{} or newer)",
                version.major,
                version.minor,
                version.patch,
                MIN_GIT_VERSION.0,
                MIN_GIT_VERSION.1
            )));
        }

        Ok(version)
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
