//! # Remote content stores
//!
//! Where generated workflows get published.
//!
//! - [`ContentStore`] - trait for reading and writing repository files
//! - [`GitHubStore`] - GitHub REST API (contents, refs, pulls)
//! - [`MockStore`] - in-memory store for tests and dry runs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use failover_gen::store::{ContentStore, GitHubStore};
//! use failover_gen::settings::GitHubSettings;
//!
//! # async fn demo() -> failover_gen::error::Result<()> {
//! let store = GitHubStore::new(GitHubSettings::from_env(None)?)?;
//! let existing = store.get_file(".github/workflows/dynamic-workflow.yml", "main").await?;
//! println!("exists: {}", existing.is_some());
//! # Ok(())
//! # }
//! ```

mod github;
mod mock;

pub use github::GitHubStore;
pub use mock::{MockStore, StoreCall};

use crate::error::Result;
use async_trait::async_trait;

/// File as it exists on the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    /// Blob sha, required to update the file
    pub sha: String,
}

/// A single-file commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    pub path: String,
    pub content: String,
    pub message: String,
    pub branch: String,
}

/// Result of a create/update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub html_url: Option<String>,
}

/// Outcome of creating a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchStatus {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: u64,
    pub html_url: String,
}

/// Read/write access to files in a hosted repository
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store name (for logs)
    fn name(&self) -> &str;

    /// Fetch file metadata. `Ok(None)` when the file does not exist.
    async fn get_file(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>>;

    async fn create_file(&self, commit: &FileCommit) -> Result<CommitInfo>;

    /// Replace an existing file; `sha` is the blob sha from [`get_file`](Self::get_file)
    async fn update_file(&self, commit: &FileCommit, sha: &str) -> Result<CommitInfo>;

    /// Commit sha at the tip of `branch`
    async fn branch_head(&self, branch: &str) -> Result<String>;

    async fn create_branch(&self, branch: &str, from_sha: &str) -> Result<BranchStatus>;

    async fn create_pull_request(&self, pr: &NewPullRequest) -> Result<PullRequestInfo>;
}
