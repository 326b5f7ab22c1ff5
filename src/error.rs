//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T> = std::result::Result<T, FailoverError>;

#[derive(Error, Debug)]
pub enum FailoverError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Config errors (FOG-010 to FOG-013)
    // ─────────────────────────────────────────────────────────────
    #[error("FOG-010: Invalid config: missing 'failover_tasks' or it's not a list")]
    MissingTaskList,

    #[error("FOG-011: Task #{index} is not a mapping")]
    InvalidTask { index: usize },

    #[error("FOG-012: Task #{index} ({task}) is missing mandatory field '{field}'")]
    MissingField {
        index: usize,
        task: String,
        field: &'static str,
    },

    #[error("FOG-013: Task #{index} field '{field}' {details}")]
    InvalidField {
        index: usize,
        field: &'static str,
        details: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Render errors (FOG-020 to FOG-021)
    // ─────────────────────────────────────────────────────────────
    #[error("FOG-020: Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("FOG-021: Rendered workflow is not valid YAML: {details}")]
    RenderedInvalid { details: String },

    // ─────────────────────────────────────────────────────────────
    // Publish errors (FOG-030 to FOG-034)
    // ─────────────────────────────────────────────────────────────
    #[error("FOG-030: Environment variable {name} is not set")]
    MissingEnv { name: &'static str },

    #[error("FOG-031: Invalid repository '{repo}' (expected owner/name)")]
    InvalidRepository { repo: String },

    #[error("FOG-032: HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("FOG-033: GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("FOG-034: Invalid GitHub API URL '{url}': {details}")]
    InvalidApiUrl { url: String, details: String },
}

impl FailoverError {
    /// True when the API answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, FailoverError::Api { status: 404, .. })
    }
}

impl FixSuggestion for FailoverError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FailoverError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            FailoverError::Io(_) => Some("Check file path and permissions"),
            FailoverError::MissingTaskList => {
                Some("Add a top-level 'failover_tasks:' list to the config file")
            }
            FailoverError::InvalidTask { .. } => {
                Some("Each entry under failover_tasks must be a mapping (Task, Type, resource, payload)")
            }
            FailoverError::MissingField { .. } => {
                Some("Every task needs Task, Type, resource and payload")
            }
            FailoverError::InvalidField { .. } => {
                Some("Use a plain string value (payload may also be a mapping)")
            }
            FailoverError::Template(_) => Some("Check the workflow template syntax"),
            FailoverError::RenderedInvalid { .. } => {
                Some("Check task values for characters that break YAML")
            }
            FailoverError::MissingEnv { .. } => {
                Some("Set GITHUB_TOKEN and GITHUB_REPOSITORY (a .env file works too)")
            }
            FailoverError::InvalidRepository { .. } => Some("Use the form owner/name"),
            FailoverError::Http(_) => Some("Check network access and GITHUB_API_URL"),
            FailoverError::Api { status: 401, .. } | FailoverError::Api { status: 403, .. } => {
                Some("Check the token has contents:write permission on the repository")
            }
            FailoverError::Api { .. } => None,
            FailoverError::InvalidApiUrl { .. } => {
                Some("Set GITHUB_API_URL to an absolute URL such as https://api.github.com")
            }
        }
    }
}
