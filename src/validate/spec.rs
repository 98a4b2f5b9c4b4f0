//! Typed views over the parts of a workflow template the rules inspect.
//!
//! Fields that are not checked are left out; deserialization ignores them.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpecView {
    pub entrypoint: Option<String>,
    pub on_exit: Option<String>,
    #[serde(default)]
    pub templates: Vec<TemplateView>,
    pub arguments: Option<ArgumentsView>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArgumentsView {
    #[serde(default)]
    pub parameters: Vec<ParameterView>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParameterView {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateView {
    #[serde(default)]
    pub name: String,
    pub container: Option<Value>,
    pub container_set: Option<Value>,
    pub script: Option<Value>,
    pub resource: Option<Value>,
    pub steps: Option<Vec<Vec<StepView>>>,
    pub dag: Option<DagView>,
    pub suspend: Option<Value>,
    pub data: Option<Value>,
    pub http: Option<Value>,
    pub plugin: Option<Value>,
}

impl TemplateView {
    /// Names of the template types this template declares.
    pub fn declared_types(&self) -> Vec<&'static str> {
        let candidates = [
            ("container", self.container.is_some()),
            ("containerSet", self.container_set.is_some()),
            ("steps", self.steps.is_some()),
            ("script", self.script.is_some()),
            ("resource", self.resource.is_some()),
            ("dag", self.dag.is_some()),
            ("suspend", self.suspend.is_some()),
            ("data", self.data.is_some()),
            ("http", self.http.is_some()),
            ("plugin", self.plugin.is_some()),
        ];
        candidates
            .into_iter()
            .filter(|(_, declared)| *declared)
            .map(|(name, _)| name)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    #[serde(default)]
    pub name: String,
    pub template: Option<String>,
    pub template_ref: Option<TemplateRefView>,
    pub inline: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRefView {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub cluster_scope: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DagView {
    #[serde(default)]
    pub tasks: Vec<DagTaskView>,
    pub target: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DagTaskView {
    #[serde(default)]
    pub name: String,
    pub template: Option<String>,
    pub template_ref: Option<TemplateRefView>,
    pub inline: Option<Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub depends: Option<String>,
}

impl DagTaskView {
    /// Task names this task waits on, from both `dependencies` and `depends`.
    pub fn upstream(&self) -> Vec<String> {
        let mut names = self.dependencies.clone();
        if let Some(expr) = &self.depends {
            names.extend(depends_task_names(expr));
        }
        names.sort();
        names.dedup();
        names
    }
}

/// Extract task names from a `depends` expression such as
/// `A && (B.Succeeded || !C.Failed)`.
pub fn depends_task_names(expr: &str) -> Vec<String> {
    expr.replace("&&", " ")
        .replace("||", " ")
        .replace(['!', '(', ')'], " ")
        .split_whitespace()
        .map(|token| token.split('.').next().unwrap_or(token).to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
