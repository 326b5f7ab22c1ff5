//! failover-gen - generate and publish failover CI workflows

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod settings;
pub mod store;
pub mod task;
pub mod template;

pub use config::FailoverConfig;
pub use error::{FailoverError, FixSuggestion};
pub use pipeline::{generate, Generated};
pub use publish::{publish_file, publish_via_pull_request, PublishOutcome, PublishRequest};
pub use settings::GitHubSettings;
pub use store::{ContentStore, GitHubStore, MockStore};
pub use task::{Task, TaskType};
pub use template::{render_workflow, WorkflowTemplate};
