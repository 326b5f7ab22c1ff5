//! The generate pipeline: load → validate → render → write

use crate::config::FailoverConfig;
use crate::error::Result;
use crate::output::write_workflow;
use crate::template::WorkflowTemplate;
use std::path::{Path, PathBuf};

/// A generated workflow, ready to publish
#[derive(Debug, Clone)]
pub struct Generated {
    pub config: FailoverConfig,
    pub content: String,
    pub path: PathBuf,
}

/// Load and validate the config file, then render it
pub fn render_file(config_path: &Path) -> Result<(FailoverConfig, String)> {
    let config = FailoverConfig::from_file(config_path)?;
    let content = WorkflowTemplate::new()?.render(&config)?;
    Ok((config, content))
}

/// Render `config_path` and write the workflow to `output_path`
pub fn generate(config_path: &Path, output_path: &Path) -> Result<Generated> {
    let (config, content) = render_file(config_path)?;
    let path = write_workflow(output_path, &content)?;

    tracing::info!(
        config = %config_path.display(),
        tasks = config.len(),
        "Generated workflow"
    );
    Ok(Generated {
        config,
        content,
        path,
    })
}
