//! Failover config parsing and validation
//!
//! The document is read as a raw YAML value first so that a missing field
//! can be reported by task position and name rather than by serde's
//! generic "missing field" message.

use crate::error::{FailoverError, Result};
use crate::task::Task;
use serde_yaml::Value;
use std::path::Path;

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Top-level key holding the task list
pub const TASKS_KEY: &str = "failover_tasks";

/// Mandatory task keys, in the order they are checked
pub const MANDATORY_FIELDS: [&str; 4] = ["Task", "Type", "resource", "payload"];

/// Parsed and validated config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailoverConfig {
    /// Tasks in document order (step order of the generated workflow)
    pub tasks: Vec<Task>,
}

impl FailoverConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = yaml.len(), "Read config file");
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut doc: Value = serde_yaml::from_str(yaml)?;
        // `<<: *anchor` merge keys are kept literally by the parser
        doc.apply_merge()?;
        Self::from_value(&doc)
    }

    pub fn from_value(doc: &Value) -> Result<Self> {
        let entries = doc
            .get(TASKS_KEY)
            .and_then(Value::as_sequence)
            .ok_or(FailoverError::MissingTaskList)?;

        let tasks = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_task(i + 1, entry))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(tasks = tasks.len(), "Config validated");
        Ok(Self { tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn parse_task(index: usize, entry: &Value) -> Result<Task> {
    if !entry.is_mapping() {
        return Err(FailoverError::InvalidTask { index });
    }

    // Best-effort label for error messages, before the id is validated
    let label = entry
        .get("Task")
        .and_then(scalar)
        .map(|id| format!("'{id}'"))
        .unwrap_or_else(|| "unnamed".to_string());

    for field in MANDATORY_FIELDS {
        if entry.get(field).map_or(true, Value::is_null) {
            return Err(FailoverError::MissingField {
                index,
                task: label,
                field,
            });
        }
    }

    let id = required_scalar(index, entry, "Task")?;
    let task_type = required_scalar(index, entry, "Type")?;
    let resource = required_scalar(index, entry, "resource")?;
    let payload = payload_text(index, &entry["payload"])?;

    let description = match entry.get("description") {
        None | Some(Value::Null) => None,
        Some(v) => Some(scalar(v).ok_or_else(|| FailoverError::InvalidField {
            index,
            field: "description",
            details: "must be a string".to_string(),
        })?),
    };

    Ok(Task {
        id,
        task_type: task_type.into(),
        resource,
        payload,
        description,
    })
}

fn required_scalar(index: usize, entry: &Value, field: &'static str) -> Result<String> {
    scalar(&entry[field]).ok_or_else(|| FailoverError::InvalidField {
        index,
        field,
        details: "must be a string, number or boolean".to_string(),
    })
}

/// Payloads may be written inline as a mapping/sequence; those are passed
/// on as compact JSON.
fn payload_text(index: usize, value: &Value) -> Result<String> {
    if let Some(s) = scalar(value) {
        return Ok(s);
    }
    match value {
        Value::Mapping(_) | Value::Sequence(_) => {
            serde_json::to_string(value).map_err(|e| FailoverError::InvalidField {
                index,
                field: "payload",
                details: format!("cannot be converted to JSON: {e}"),
            })
        }
        _ => Err(FailoverError::InvalidField {
            index,
            field: "payload",
            details: "must be a string or a mapping".to_string(),
        }),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar(&tagged.value),
        _ => None,
    }
}
