//! Run settings sourced from the environment
//!
//! | Variable            | Meaning                       | Default                  |
//! |---------------------|-------------------------------|--------------------------|
//! | `GITHUB_REPOSITORY` | target repo, `owner/name`     | required for publish     |
//! | `GITHUB_TOKEN`      | API token                     | required for publish     |
//! | `GITHUB_API_URL`    | API base URL                  | `https://api.github.com` |
//!
//! These are the variables GitHub Actions sets for every job, so the binary
//! works unmodified inside a workflow run.

use crate::error::{FailoverError, Result};
use std::fmt;

pub const REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const API_URL_ENV: &str = "GITHUB_API_URL";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";

/// `owner/name` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(FailoverError::InvalidRepository {
                repo: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything needed to talk to the GitHub API
#[derive(Clone)]
pub struct GitHubSettings {
    pub repository: Repository,
    pub token: String,
    pub api_url: String,
}

impl GitHubSettings {
    /// Read settings from the process environment. `repo_override` takes
    /// precedence over `GITHUB_REPOSITORY`.
    pub fn from_env(repo_override: Option<&str>) -> Result<Self> {
        Self::from_lookup(repo_override, |name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup
    pub fn from_lookup<F>(repo_override: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let repo = match repo_override {
            Some(r) => r.to_string(),
            None => non_empty(REPOSITORY_ENV).ok_or(FailoverError::MissingEnv {
                name: REPOSITORY_ENV,
            })?,
        };
        let token = non_empty(TOKEN_ENV).ok_or(FailoverError::MissingEnv { name: TOKEN_ENV })?;
        let api_url = non_empty(API_URL_ENV)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            repository: Repository::parse(&repo)?,
            token,
            api_url,
        })
    }
}

// Keeps the token out of logs
impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("repository", &self.repository)
            .field("token", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}
