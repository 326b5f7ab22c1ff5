//! # Failover tasks
//!
//! One record per remediation action. Each task becomes one step of the
//! generated workflow.
//!
//! ```yaml
//! failover_tasks:
//!   - Task: promote-replica
//!     Type: invoke-lambda
//!     resource: arn:aws:lambda:eu-west-1:123456789012:function:promote
//!     payload: '{"cluster": "orders"}'
//!     description: Promote the read replica
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type value that routes a step to the Lambda reusable workflow
pub const INVOKE_LAMBDA: &str = "invoke-lambda";

/// Reusable workflow used by `invoke-lambda` tasks
pub const LAMBDA_WORKFLOW: &str = "invoke-lambda.yaml";

/// Reusable workflow used by every other task type
pub const STEP_FUNCTION_WORKFLOW: &str = "invoke-step-function.yaml";

/// A single failover task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Task identifier (`Task` key)
    pub id: String,

    /// `Type` key
    #[serde(rename = "type")]
    pub task_type: TaskType,

    pub resource: String,

    pub payload: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        task_type: impl Into<TaskType>,
        resource: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            task_type: task_type.into(),
            resource: resource.into(),
            payload: payload.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Task type. Only `invoke-lambda` is special; anything else takes the
/// default branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskType {
    InvokeLambda,
    Other(String),
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            TaskType::InvokeLambda => INVOKE_LAMBDA,
            TaskType::Other(s) => s,
        }
    }

    /// Reusable workflow file a step of this type delegates to
    pub fn reusable_workflow(&self) -> &'static str {
        match self {
            TaskType::InvokeLambda => LAMBDA_WORKFLOW,
            TaskType::Other(_) => STEP_FUNCTION_WORKFLOW,
        }
    }
}

impl From<String> for TaskType {
    fn from(s: String) -> Self {
        if s == INVOKE_LAMBDA {
            TaskType::InvokeLambda
        } else {
            TaskType::Other(s)
        }
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        TaskType::from(s.to_string())
    }
}

impl From<TaskType> for String {
    fn from(t: TaskType) -> Self {
        match t {
            TaskType::InvokeLambda => INVOKE_LAMBDA.to_string(),
            TaskType::Other(s) => s,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_from_str() {
        assert_eq!(TaskType::from("invoke-lambda"), TaskType::InvokeLambda);
        assert_eq!(
            TaskType::from("invoke-step-function"),
            TaskType::Other("invoke-step-function".to_string())
        );
    }

    #[test]
    fn test_task_type_is_case_sensitive() {
        assert!(matches!(TaskType::from("Invoke-Lambda"), TaskType::Other(_)));
    }

    #[test]
    fn test_reusable_workflow_selection() {
        assert_eq!(TaskType::InvokeLambda.reusable_workflow(), "invoke-lambda.yaml");
        assert_eq!(
            TaskType::from("anything").reusable_workflow(),
            "invoke-step-function.yaml"
        );
    }

    #[test]
    fn test_task_serializes_type_as_string() {
        let task = Task::new("t1", "invoke-lambda", "fn", "{}").with_description("d");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "invoke-lambda");
        assert_eq!(json["description"], "d");
    }
}
