//! Publishing the generated workflow to a remote repository
//!
//! Two modes:
//! - [`publish_file`] commits straight to a branch
//! - [`publish_via_pull_request`] commits to a side branch and opens a PR
//!
//! Both use the same naive create-or-update: look the file up, update it if
//! found, otherwise create it. A failed lookup of any kind is treated as
//! "not found" and falls through to create.

use crate::error::Result;
use crate::store::{BranchStatus, CommitInfo, ContentStore, FileCommit, NewPullRequest, PullRequestInfo};
use std::fmt;

pub const CREATE_MESSAGE: &str = "Create dynamic workflow";
pub const UPDATE_MESSAGE: &str = "Update dynamic workflow";

pub const PR_BRANCH: &str = "update-dynamic-workflow";
pub const PR_TITLE: &str = "Automated update of dynamic workflow";
pub const PR_BODY: &str = "This PR updates the dynamic workflow file.";

/// What to publish and where
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Repository-relative path
    pub path: String,
    pub content: String,
    /// Target branch (base branch in pull-request mode)
    pub branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    Created,
    Updated,
}

impl fmt::Display for PublishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishAction::Created => f.write_str("created"),
            PublishAction::Updated => f.write_str("updated"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub action: PublishAction,
    pub path: String,
    pub branch: String,
    pub commit: CommitInfo,
}

/// Pull-request mode options
#[derive(Debug, Clone)]
pub struct PullRequestOptions {
    pub head_branch: String,
    pub title: String,
    pub body: String,
}

impl Default for PullRequestOptions {
    fn default() -> Self {
        Self {
            head_branch: PR_BRANCH.to_string(),
            title: PR_TITLE.to_string(),
            body: PR_BODY.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PullRequestOutcome {
    pub branch_status: BranchStatus,
    pub file: PublishOutcome,
    pub pull_request: PullRequestInfo,
}

/// Create or update `request.path` on `request.branch`.
pub async fn publish_file(
    store: &dyn ContentStore,
    request: &PublishRequest,
) -> Result<PublishOutcome> {
    let existing = match store.get_file(&request.path, &request.branch).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                store = store.name(),
                path = %request.path,
                error = %e,
                "Lookup failed, falling back to create"
            );
            None
        }
    };

    let (action, commit) = match existing {
        Some(file) => {
            let commit = FileCommit {
                path: request.path.clone(),
                content: request.content.clone(),
                message: UPDATE_MESSAGE.to_string(),
                branch: request.branch.clone(),
            };
            let info = store.update_file(&commit, &file.sha).await?;
            (PublishAction::Updated, info)
        }
        None => {
            let commit = FileCommit {
                path: request.path.clone(),
                content: request.content.clone(),
                message: CREATE_MESSAGE.to_string(),
                branch: request.branch.clone(),
            };
            let info = store.create_file(&commit).await?;
            (PublishAction::Created, info)
        }
    };

    tracing::info!(
        store = store.name(),
        path = %request.path,
        branch = %request.branch,
        action = %action,
        commit = %commit.sha,
        "Published workflow"
    );

    Ok(PublishOutcome {
        action,
        path: request.path.clone(),
        branch: request.branch.clone(),
        commit,
    })
}

/// Branch off `request.branch`, publish the file on the new branch, then
/// open a pull request back into `request.branch`. An existing head branch
/// is reused.
pub async fn publish_via_pull_request(
    store: &dyn ContentStore,
    request: &PublishRequest,
    options: &PullRequestOptions,
) -> Result<PullRequestOutcome> {
    let base_sha = store.branch_head(&request.branch).await?;
    let branch_status = store.create_branch(&options.head_branch, &base_sha).await?;
    tracing::info!(
        store = store.name(),
        branch = %options.head_branch,
        base = %request.branch,
        status = ?branch_status,
        "Prepared head branch"
    );

    let on_head = PublishRequest {
        branch: options.head_branch.clone(),
        ..request.clone()
    };
    let file = publish_file(store, &on_head).await?;

    let pull_request = store
        .create_pull_request(&NewPullRequest {
            title: options.title.clone(),
            body: options.body.clone(),
            head: options.head_branch.clone(),
            base: request.branch.clone(),
        })
        .await?;
    tracing::info!(
        store = store.name(),
        number = pull_request.number,
        url = %pull_request.html_url,
        "Opened pull request"
    );

    Ok(PullRequestOutcome {
        branch_status,
        file,
        pull_request,
    })
}
