//! GitHub store using the REST API
//!
//! Uses the contents API for files, the git refs API for branches and the
//! pulls API for pull requests. Requires a token with `contents:write`
//! (and `pull-requests:write` for pull-request mode).

use super::{
    BranchStatus, CommitInfo, ContentStore, FileCommit, NewPullRequest, PullRequestInfo,
    RemoteFile,
};
use crate::error::{FailoverError, Result};
use crate::settings::GitHubSettings;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("failover-gen/", env!("CARGO_PKG_VERSION"));

pub struct GitHubStore {
    client: reqwest::Client,
    settings: GitHubSettings,
    base: Url,
}

impl GitHubStore {
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        let base = Url::parse(&settings.api_url).map_err(|e| FailoverError::InvalidApiUrl {
            url: settings.api_url.clone(),
            details: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FailoverError::InvalidApiUrl {
                url: settings.api_url.clone(),
                details: "not a base URL".to_string(),
            });
        }

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            settings,
            base,
        })
    }

    pub fn settings(&self) -> &GitHubSettings {
        &self.settings
    }

    /// `{api}/repos/{owner}/{name}/{segments...}`, each segment percent-encoded
    fn repo_url<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend([
                    "repos",
                    self.settings.repository.owner.as_str(),
                    self.settings.repository.name.as_str(),
                ])
                .extend(segments);
        }
        url
    }

    fn contents_url(&self, path: &str) -> Url {
        self.repo_url(std::iter::once("contents").chain(normalize_path(path).split('/')))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.settings.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn put_contents(&self, commit: &FileCommit, sha: Option<&str>) -> Result<CommitInfo> {
        let body = PutContentsRequest {
            message: &commit.message,
            content: base64::encode(commit.content.as_bytes()),
            branch: &commit.branch,
            sha,
        };

        tracing::debug!(
            store = "github",
            path = %commit.path,
            branch = %commit.branch,
            update = sha.is_some(),
            "PUT contents"
        );

        let response = self
            .authorized(self.client.put(self.contents_url(&commit.path)))
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;

        let parsed: PutContentsResponse = response.json().await?;
        Ok(CommitInfo {
            sha: parsed.commit.sha,
            html_url: parsed.commit.html_url,
        })
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    fn name(&self) -> &str {
        "github"
    }

    async fn get_file(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>> {
        let response = self
            .authorized(self.client.get(self.contents_url(path)))
            .query(&[("ref", branch)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response).await?;

        let file: ContentsResponse = response.json().await?;
        Ok(Some(RemoteFile {
            path: file.path,
            sha: file.sha,
        }))
    }

    async fn create_file(&self, commit: &FileCommit) -> Result<CommitInfo> {
        self.put_contents(commit, None).await
    }

    async fn update_file(&self, commit: &FileCommit, sha: &str) -> Result<CommitInfo> {
        self.put_contents(commit, Some(sha)).await
    }

    async fn branch_head(&self, branch: &str) -> Result<String> {
        let response = self
            .authorized(
                self.client.get(
                    self.repo_url(["git", "ref", "heads"].into_iter().chain(branch.split('/'))),
                ),
            )
            .send()
            .await?;
        let response = check(response).await?;

        let git_ref: GitRefResponse = response.json().await?;
        Ok(git_ref.object.sha)
    }

    async fn create_branch(&self, branch: &str, from_sha: &str) -> Result<BranchStatus> {
        let body = CreateRefRequest {
            git_ref: format!("refs/heads/{branch}"),
            sha: from_sha,
        };
        let response = self
            .authorized(self.client.post(self.repo_url(["git", "refs"])))
            .json(&body)
            .send()
            .await?;

        match check(response).await {
            Ok(_) => Ok(BranchStatus::Created),
            // GitHub answers 422 "Reference already exists"
            Err(FailoverError::Api { status: 422, message })
                if message.contains("already exists") =>
            {
                Ok(BranchStatus::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_pull_request(&self, pr: &NewPullRequest) -> Result<PullRequestInfo> {
        let body = CreatePullRequest {
            title: &pr.title,
            body: &pr.body,
            head: &pr.head,
            base: &pr.base,
        };
        let response = self
            .authorized(self.client.post(self.repo_url(["pulls"])))
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;

        let created: PullRequestResponse = response.json().await?;
        Ok(PullRequestInfo {
            number: created.number,
            html_url: created.html_url,
        })
    }
}

/// Turn a non-success response into [`FailoverError::Api`]
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.message)
        .unwrap_or(text);

    tracing::warn!(store = "github", status = %status, error = %message, "GitHub API error");
    Err(FailoverError::Api {
        status: status.as_u16(),
        message,
    })
}

fn normalize_path(path: &str) -> &str {
    path.trim_start_matches("./").trim_start_matches('/')
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    path: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    commit: CommitResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitRefResponse {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePullRequest<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Repository;

    fn store() -> GitHubStore {
        GitHubStore::new(GitHubSettings {
            repository: Repository::parse("acme/infra").unwrap(),
            token: "t".to_string(),
            api_url: "https://api.example.test".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_contents_url() {
        assert_eq!(
            store()
                .contents_url(".github/workflows/dynamic-workflow.yml")
                .as_str(),
            "https://api.example.test/repos/acme/infra/contents/.github/workflows/dynamic-workflow.yml"
        );
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        assert_eq!(
            store().contents_url("dir/a#b?c%d e.yml").as_str(),
            "https://api.example.test/repos/acme/infra/contents/dir/a%23b%3Fc%25d%20e.yml"
        );
    }

    #[test]
    fn test_repo_url_keeps_api_prefix() {
        let store = GitHubStore::new(GitHubSettings {
            repository: Repository::parse("acme/infra").unwrap(),
            token: "t".to_string(),
            api_url: "https://ghe.example.test/api/v3".to_string(),
        })
        .unwrap();
        assert_eq!(
            store
                .repo_url(["git", "ref", "heads"].into_iter().chain("feature/x".split('/')))
                .as_str(),
            "https://ghe.example.test/api/v3/repos/acme/infra/git/ref/heads/feature/x"
        );
    }

    #[test]
    fn test_invalid_api_url_is_rejected() {
        let result = GitHubStore::new(GitHubSettings {
            repository: Repository::parse("acme/infra").unwrap(),
            token: "t".to_string(),
            api_url: "not a url".to_string(),
        });
        assert!(matches!(result, Err(FailoverError::InvalidApiUrl { .. })));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./a/b.yml"), "a/b.yml");
        assert_eq!(normalize_path("/a/b.yml"), "a/b.yml");
        assert_eq!(normalize_path(".github/x.yml"), ".github/x.yml");
    }

    #[test]
    fn test_put_body_omits_sha_on_create() {
        let body = PutContentsRequest {
            message: "m",
            content: base64::encode("hi"),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["content"], "aGk=");
    }
}
