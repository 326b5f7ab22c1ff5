//! Writing the generated workflow to disk

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Default output location, relative to the working directory
pub const DEFAULT_WORKFLOW_FILE: &str = ".github/workflows/dynamic-workflow.yml";

/// Write `content` to `path`, creating parent directories as needed.
/// An existing file is overwritten.
pub fn write_workflow(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    tracing::info!(path = %path.display(), bytes = content.len(), "Wrote workflow file");
    Ok(path.to_path_buf())
}
