//! In-memory store for testing
//!
//! Keeps files per branch and records every call for assertions.
//! Lookups can be made to fail to exercise the create fallback.

use super::{
    BranchStatus, CommitInfo, ContentStore, FileCommit, NewPullRequest, PullRequestInfo,
    RemoteFile,
};
use crate::error::{FailoverError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// A call made against the mock (for assertions)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetFile { path: String, branch: String },
    CreateFile(FileCommit),
    UpdateFile { commit: FileCommit, sha: String },
    BranchHead { branch: String },
    CreateBranch { branch: String, from_sha: String },
    CreatePullRequest(NewPullRequest),
}

#[derive(Default)]
struct State {
    /// (branch, path) -> (content, blob sha)
    files: HashMap<(String, String), (String, String)>,
    /// branch -> head commit sha
    branches: HashMap<String, String>,
    calls: Vec<StoreCall>,
    next_sha: u64,
    next_pr: u64,
    fail_lookups: bool,
}

impl State {
    fn sha(&mut self) -> String {
        self.next_sha += 1;
        format!("sha-{}", self.next_sha)
    }
}

pub struct MockStore {
    state: Mutex<State>,
}

impl MockStore {
    /// Empty store with a `main` branch
    pub fn new() -> Self {
        let store = Self {
            state: Mutex::new(State::default()),
        };
        store.add_branch("main");
        store
    }

    /// Make every `get_file` fail with a 500
    pub fn with_failing_lookups(self) -> Self {
        self.state.lock().fail_lookups = true;
        self
    }

    /// Seed an existing file
    pub fn with_file(self, branch: &str, path: &str, content: &str) -> Self {
        {
            let mut state = self.state.lock();
            let sha = state.sha();
            state
                .files
                .insert((branch.to_string(), path.to_string()), (content.to_string(), sha));
        }
        self
    }

    pub fn add_branch(&self, branch: &str) {
        let mut state = self.state.lock();
        let sha = state.sha();
        state.branches.insert(branch.to_string(), sha);
    }

    /// Current content of a file
    pub fn content(&self, branch: &str, path: &str) -> Option<String> {
        self.state
            .lock()
            .files
            .get(&(branch.to_string(), path.to_string()))
            .map(|(content, _)| content.clone())
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.state.lock().branches.contains_key(branch)
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_file(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::GetFile {
            path: path.to_string(),
            branch: branch.to_string(),
        });

        if state.fail_lookups {
            return Err(FailoverError::Api {
                status: 500,
                message: "lookup failed".to_string(),
            });
        }

        Ok(state
            .files
            .get(&(branch.to_string(), path.to_string()))
            .map(|(_, sha)| RemoteFile {
                path: path.to_string(),
                sha: sha.clone(),
            }))
    }

    async fn create_file(&self, commit: &FileCommit) -> Result<CommitInfo> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::CreateFile(commit.clone()));

        let key = (commit.branch.clone(), commit.path.clone());
        if state.files.contains_key(&key) {
            // Matches the contents API: creating over an existing file needs a sha
            return Err(FailoverError::Api {
                status: 422,
                message: "\"sha\" wasn't supplied.".to_string(),
            });
        }

        let sha = state.sha();
        state.files.insert(key, (commit.content.clone(), sha));
        Ok(CommitInfo {
            sha: state.sha(),
            html_url: None,
        })
    }

    async fn update_file(&self, commit: &FileCommit, sha: &str) -> Result<CommitInfo> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::UpdateFile {
            commit: commit.clone(),
            sha: sha.to_string(),
        });

        let key = (commit.branch.clone(), commit.path.clone());
        match state.files.get(&key) {
            Some((_, current)) if current == sha => {}
            _ => {
                return Err(FailoverError::Api {
                    status: 409,
                    message: format!("{} does not match {}", sha, commit.path),
                })
            }
        }

        let blob = state.sha();
        state.files.insert(key, (commit.content.clone(), blob));
        Ok(CommitInfo {
            sha: state.sha(),
            html_url: None,
        })
    }

    async fn branch_head(&self, branch: &str) -> Result<String> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::BranchHead {
            branch: branch.to_string(),
        });
        state.branches.get(branch).cloned().ok_or(FailoverError::Api {
            status: 404,
            message: "Not Found".to_string(),
        })
    }

    async fn create_branch(&self, branch: &str, from_sha: &str) -> Result<BranchStatus> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::CreateBranch {
            branch: branch.to_string(),
            from_sha: from_sha.to_string(),
        });

        if state.branches.contains_key(branch) {
            return Ok(BranchStatus::AlreadyExists);
        }
        state
            .branches
            .insert(branch.to_string(), from_sha.to_string());
        Ok(BranchStatus::Created)
    }

    async fn create_pull_request(&self, pr: &NewPullRequest) -> Result<PullRequestInfo> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::CreatePullRequest(pr.clone()));

        state.next_pr += 1;
        let number = state.next_pr;
        Ok(PullRequestInfo {
            number,
            html_url: format!("https://example.test/pull/{number}"),
        })
    }
}
