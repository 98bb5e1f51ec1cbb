pub mod async_repository;
pub mod executor;
pub mod parser;
pub mod repository;
pub mod version;

// Re-export commonly used types
pub use async_repository::AsyncRepository;
pub use executor::{CommandOutput, CommandRunner, GitExecutor};
pub use parser::{
    CommitLogEntry, FileStatus, StatusEntry, classify_failure, parse_commit_date,
    parse_commit_hash, parse_count, parse_log, parse_repository_name, parse_status_porcelain_v2,
    parse_tag_list,
};
pub use repository::Repository;
pub use version::GitVersion;
