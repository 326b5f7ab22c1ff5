//! Workflow template rendering
//!
//! Renders a [`FailoverConfig`] into a GitHub Actions workflow with minijinja.
//! Each task becomes one step. The step's reusable workflow is picked by the
//! task type: `invoke-lambda` goes to `invoke-lambda.yaml`, everything else to
//! `invoke-step-function.yaml`.
//!
//! Interpolated values go through the `quote` filter, which emits a JSON
//! string literal. JSON strings are valid YAML double-quoted scalars, so any
//! payload text (quotes, colons, newlines) yields a well-formed workflow.

use crate::config::FailoverConfig;
use crate::error::{FailoverError, Result};
use crate::task::{INVOKE_LAMBDA, LAMBDA_WORKFLOW, STEP_FUNCTION_WORKFLOW};
use minijinja::{context, Environment, ErrorKind};

const TEMPLATE_NAME: &str = "dynamic-workflow.yml";

const WORKFLOW_TEMPLATE: &str = r#"name: Dynamic Workflow

on:
  push:
    branches:
      - main

jobs:
  failover-tasks:
    runs-on: ubuntu-latest
    steps:
      - name: Checkout repository
        uses: actions/checkout@v3
{%- for task in failover_tasks %}
      - name: {{ ("Run Task " ~ task.id ~ (" - " ~ task.description if task.description else "")) | quote }}
        uses: ./.github/workflows/{% if task.type == invoke_lambda %}{{ lambda_workflow }}{% else %}{{ step_function_workflow }}{% endif %}
        with:
          resource: {{ task.resource | quote }}
          payload: {{ task.payload | quote }}
{%- endfor %}
"#;

/// Compiled workflow template
pub struct WorkflowTemplate {
    env: Environment<'static>,
}

impl WorkflowTemplate {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_filter("quote", quote);
        env.add_template(TEMPLATE_NAME, WORKFLOW_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the workflow for `config`.
    ///
    /// Output is deterministic for a given config. The result is re-parsed
    /// as YAML before being returned.
    pub fn render(&self, config: &FailoverConfig) -> Result<String> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let rendered = template.render(context! {
            failover_tasks => &config.tasks,
            invoke_lambda => INVOKE_LAMBDA,
            lambda_workflow => LAMBDA_WORKFLOW,
            step_function_workflow => STEP_FUNCTION_WORKFLOW,
        })?;

        serde_yaml::from_str::<serde_yaml::Value>(&rendered).map_err(|e| {
            FailoverError::RenderedInvalid {
                details: e.to_string(),
            }
        })?;

        tracing::debug!(
            steps = config.tasks.len(),
            bytes = rendered.len(),
            "Rendered workflow"
        );
        Ok(rendered)
    }
}

/// Convenience function for one-off renders
pub fn render_workflow(config: &FailoverConfig) -> Result<String> {
    WorkflowTemplate::new()?.render(config)
}

fn quote(value: String) -> std::result::Result<String, minijinja::Error> {
    let json = serde_json::to_string(&value)
        .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
    Ok(escape_non_printable(&json))
}

/// JSON leaves DEL and the C1 controls raw, but YAML only accepts them
/// escaped. `\uXXXX` is valid in both.
fn escape_non_printable(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_control() || matches!(c, '\u{FEFF}' | '\u{FFFE}' | '\u{FFFF}') {
            out.push_str(&format!("\\u{:04X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}
