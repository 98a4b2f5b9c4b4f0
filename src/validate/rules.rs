//! Structural rules for workflow templates
//!
//! Each check returns the first violation it finds as a message prefixed with
//! the location of the offending field.

use super::getter::WorkflowTemplateGetter;
use super::manifest::WorkflowTemplate;
use super::spec::{DagView, StepView, TemplateRefView, TemplateView, WorkflowSpecView};
use once_cell::sync::Lazy;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

const MAX_RESOURCE_NAME_LEN: usize = 253;
const MAX_TEMPLATE_NAME_LEN: usize = 128;

const TEMPLATE_TYPES: &str =
    "container, containerSet, steps, script, resource, dag, suspend, data, http, plugin";

static DNS_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid DNS subdomain regex")
});

static TEMPLATE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9]*$").expect("valid template name regex"));

pub type RuleResult = Result<(), String>;

/// Validate one workflow template, resolving `templateRef`s through `getter`.
pub fn validate_template(
    template: &WorkflowTemplate,
    getter: &dyn WorkflowTemplateGetter,
) -> RuleResult {
    check_metadata_name(template)?;

    let spec: WorkflowSpecView = match template.spec() {
        Some(spec) => serde_json::from_value(spec.clone()).map_err(|e| format!("spec: {e}"))?,
        None => return Err("spec is required".to_string()),
    };

    if spec.templates.is_empty() {
        return Err("spec.templates must contain at least one template".to_string());
    }

    let names = check_template_names(&spec.templates)?;

    if let Some(entrypoint) = spec.entrypoint.as_deref().filter(|e| !e.is_empty()) {
        if !names.contains(entrypoint) {
            return Err(format!("spec.entrypoint template '{entrypoint}' not found"));
        }
    }
    if let Some(on_exit) = spec.on_exit.as_deref().filter(|e| !e.is_empty()) {
        if !names.contains(on_exit) {
            return Err(format!("spec.onExit template '{on_exit}' not found"));
        }
    }

    if let Some(arguments) = &spec.arguments {
        let mut seen = HashSet::new();
        for (idx, parameter) in arguments.parameters.iter().enumerate() {
            if parameter.name.is_empty() {
                return Err(format!("spec.arguments.parameters[{idx}].name is required"));
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(format!(
                    "spec.arguments.parameters[{idx}].name '{}' is not unique",
                    parameter.name
                ));
            }
        }
    }

    for tmpl in &spec.templates {
        check_template(tmpl, &names, getter)?;
    }
    Ok(())
}

fn check_metadata_name(template: &WorkflowTemplate) -> RuleResult {
    let name = template.name();
    if name.is_empty() {
        return Err("metadata.name or metadata.generateName is required".to_string());
    }
    // generateName is a prefix and may end with '-'
    let (field, candidate) = if template.is_generated_name() {
        ("metadata.generateName", name.trim_end_matches('-'))
    } else {
        ("metadata.name", name)
    };
    if name.len() > MAX_RESOURCE_NAME_LEN || !DNS_SUBDOMAIN.is_match(candidate) {
        return Err(format!(
            "{field} '{name}' must be a lowercase RFC 1123 subdomain of at most {MAX_RESOURCE_NAME_LEN} characters"
        ));
    }
    Ok(())
}

fn check_template_names(templates: &[TemplateView]) -> Result<HashSet<&str>, String> {
    let mut names = HashSet::new();
    for (idx, tmpl) in templates.iter().enumerate() {
        if tmpl.name.is_empty() {
            return Err(format!("spec.templates[{idx}].name is required"));
        }
        if tmpl.name.len() > MAX_TEMPLATE_NAME_LEN || !TEMPLATE_NAME.is_match(&tmpl.name) {
            return Err(format!(
                "templates.{} name must match {} and be at most {MAX_TEMPLATE_NAME_LEN} characters",
                tmpl.name,
                TEMPLATE_NAME.as_str()
            ));
        }
        if !names.insert(tmpl.name.as_str()) {
            return Err(format!("templates.{} is not unique", tmpl.name));
        }
    }
    Ok(names)
}

fn check_template(
    tmpl: &TemplateView,
    names: &HashSet<&str>,
    getter: &dyn WorkflowTemplateGetter,
) -> RuleResult {
    let declared = tmpl.declared_types();
    match declared.len() {
        0 => {
            return Err(format!(
                "templates.{} template type unspecified. choose one of: {TEMPLATE_TYPES}",
                tmpl.name
            ))
        }
        1 => {}
        _ => {
            return Err(format!(
                "templates.{} multiple template types specified: {}",
                tmpl.name,
                declared.join(", ")
            ))
        }
    }

    for (kind, body) in [("container", &tmpl.container), ("script", &tmpl.script)] {
        if let Some(body) = body {
            let image = body.get("image").and_then(|v| v.as_str()).unwrap_or("");
            if image.is_empty() {
                return Err(format!("templates.{}.{kind}.image may not be empty", tmpl.name));
            }
        }
    }

    if let Some(groups) = &tmpl.steps {
        check_steps(&tmpl.name, groups, names, getter)?;
    }
    if let Some(dag) = &tmpl.dag {
        check_dag(&tmpl.name, dag, names, getter)?;
    }
    Ok(())
}

fn check_steps(
    owner: &str,
    groups: &[Vec<StepView>],
    names: &HashSet<&str>,
    getter: &dyn WorkflowTemplateGetter,
) -> RuleResult {
    for (g_idx, group) in groups.iter().enumerate() {
        for (s_idx, step) in group.iter().enumerate() {
            let location = format!("templates.{owner}.steps[{g_idx}][{s_idx}]");
            if step.name.is_empty() {
                return Err(format!("{location}.name is required"));
            }
            let location = format!("templates.{owner}.steps[{g_idx}].{}", step.name);
            check_reference(
                &location,
                step.template.as_deref(),
                step.template_ref.as_ref(),
                step.inline.is_some(),
                names,
                getter,
            )?;
        }
    }
    Ok(())
}

fn check_dag(
    owner: &str,
    dag: &DagView,
    names: &HashSet<&str>,
    getter: &dyn WorkflowTemplateGetter,
) -> RuleResult {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut nodes = HashMap::new();
    for (idx, task) in dag.tasks.iter().enumerate() {
        if task.name.is_empty() {
            return Err(format!("templates.{owner}.tasks[{idx}].name is required"));
        }
        if nodes.contains_key(task.name.as_str()) {
            return Err(format!("templates.{owner}.tasks.{} is not unique", task.name));
        }
        nodes.insert(task.name.as_str(), graph.add_node(task.name.as_str()));
    }

    for task in &dag.tasks {
        let location = format!("templates.{owner}.tasks.{}", task.name);
        check_reference(
            &location,
            task.template.as_deref(),
            task.template_ref.as_ref(),
            task.inline.is_some(),
            names,
            getter,
        )?;
        for upstream in task.upstream() {
            let Some(&from) = nodes.get(upstream.as_str()) else {
                return Err(format!("{location} dependency '{upstream}' not defined"));
            };
            graph.add_edge(from, nodes[task.name.as_str()], ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        return Err(format!(
            "templates.{owner} dependency cycle detected at task '{}'",
            graph[cycle.node_id()]
        ));
    }

    if let Some(target) = dag.target.as_deref().filter(|t| !t.is_empty()) {
        for name in target.split_whitespace() {
            if !nodes.contains_key(name) {
                return Err(format!("templates.{owner}.targets: target '{name}' is not defined"));
            }
        }
    }
    Ok(())
}

fn check_reference(
    location: &str,
    template: Option<&str>,
    template_ref: Option<&TemplateRefView>,
    inline: bool,
    names: &HashSet<&str>,
    getter: &dyn WorkflowTemplateGetter,
) -> RuleResult {
    let count = [template.is_some(), template_ref.is_some(), inline]
        .into_iter()
        .filter(|set| *set)
        .count();
    if count != 1 {
        return Err(format!(
            "{location} must have exactly one of template, templateRef or inline"
        ));
    }

    if let Some(name) = template {
        if !names.contains(name) {
            return Err(format!("{location} template '{name}' not found"));
        }
    }

    if let Some(reference) = template_ref {
        if reference.cluster_scope {
            debug!(
                "{} references cluster-scoped template {}/{}; not resolvable offline",
                location, reference.name, reference.template
            );
            return Ok(());
        }
        let Some(target) = getter.get(&reference.name) else {
            return Err(format!(
                "{location} templateRef: workflow template '{}' not found",
                reference.name
            ));
        };
        let spec: WorkflowSpecView = target
            .spec()
            .and_then(|spec| serde_json::from_value(spec.clone()).ok())
            .unwrap_or_default();
        if !spec.templates.iter().any(|t| t.name == reference.template) {
            return Err(format!(
                "{location} templateRef: template '{}' not found in workflow template '{}'",
                reference.template, reference.name
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::getter::ManifestTemplateGetter;
    use serde_json::json;

    fn template(spec: serde_json::Value) -> WorkflowTemplate {
        WorkflowTemplate::from_manifest(json!({
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "WorkflowTemplate",
            "metadata": {"name": "sample"},
            "spec": spec,
        }))
    }

    fn check(spec: serde_json::Value) -> RuleResult {
        validate_template(&template(spec), &ManifestTemplateGetter::new("default"))
    }

    #[test]
    fn test_valid_container_template() {
        let result = check(json!({
            "entrypoint": "main",
            "templates": [{"name": "main", "container": {"image": "alpine"}}]
        }));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_missing_templates() {
        let err = check(json!({"entrypoint": "main"})).unwrap_err();
        assert!(err.contains("at least one template"));
    }

    #[test]
    fn test_entrypoint_must_exist() {
        let err = check(json!({
            "entrypoint": "missing",
            "templates": [{"name": "main", "suspend": {}}]
        }))
        .unwrap_err();
        assert_eq!(err, "spec.entrypoint template 'missing' not found");
    }

    #[test]
    fn test_template_type_required_and_exclusive() {
        let err = check(json!({"templates": [{"name": "main"}]})).unwrap_err();
        assert!(err.contains("template type unspecified"));

        let err = check(json!({"templates": [{
            "name": "main",
            "container": {"image": "alpine"},
            "suspend": {}
        }]}))
        .unwrap_err();
        assert!(err.contains("multiple template types specified: container, suspend"));
    }

    #[test]
    fn test_container_image_required() {
        let err = check(json!({"templates": [{"name": "main", "container": {}}]})).unwrap_err();
        assert_eq!(err, "templates.main.container.image may not be empty");
    }

    #[test]
    fn test_duplicate_template_names() {
        let err = check(json!({"templates": [
            {"name": "a", "suspend": {}},
            {"name": "a", "suspend": {}}
        ]}))
        .unwrap_err();
        assert_eq!(err, "templates.a is not unique");
    }

    #[test]
    fn test_step_references_unknown_template() {
        let err = check(json!({"templates": [
            {"name": "main", "steps": [[{"name": "one", "template": "nope"}]]}
        ]}))
        .unwrap_err();
        assert_eq!(err, "templates.main.steps[0].one template 'nope' not found");
    }

    #[test]
    fn test_dag_cycle_detected() {
        let err = check(json!({"templates": [
            {"name": "leaf", "suspend": {}},
            {"name": "main", "dag": {"tasks": [
                {"name": "a", "template": "leaf", "dependencies": ["b"]},
                {"name": "b", "template": "leaf", "depends": "a.Succeeded"}
            ]}}
        ]}))
        .unwrap_err();
        assert!(err.contains("dependency cycle detected"));
    }

    #[test]
    fn test_dag_unknown_dependency() {
        let err = check(json!({"templates": [
            {"name": "leaf", "suspend": {}},
            {"name": "main", "dag": {"tasks": [
                {"name": "a", "template": "leaf", "dependencies": ["ghost"]}
            ]}}
        ]}))
        .unwrap_err();
        assert_eq!(err, "templates.main.tasks.a dependency 'ghost' not defined");
    }

    #[test]
    fn test_template_ref_resolved_through_getter() {
        let mut getter = ManifestTemplateGetter::new("default");
        getter.insert(WorkflowTemplate::from_manifest(json!({
            "kind": "WorkflowTemplate",
            "metadata": {"name": "library"},
            "spec": {"templates": [{"name": "echo", "container": {"image": "alpine"}}]}
        })));

        let referencing = |tmpl: &str| {
            template(json!({"templates": [
                {"name": "main", "steps": [[{
                    "name": "call",
                    "templateRef": {"name": "library", "template": tmpl}
                }]]}
            ]}))
        };

        assert_eq!(validate_template(&referencing("echo"), &getter), Ok(()));
        let err = validate_template(&referencing("missing"), &getter).unwrap_err();
        assert!(err.contains("template 'missing' not found in workflow template 'library'"));
    }

    #[test]
    fn test_cluster_scoped_ref_is_skipped() {
        let result = check(json!({"templates": [
            {"name": "main", "steps": [[{
                "name": "call",
                "templateRef": {"name": "global", "template": "x", "clusterScope": true}
            }]]}
        ]}));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_metadata_name_format() {
        let bad = WorkflowTemplate::from_manifest(json!({
            "kind": "WorkflowTemplate",
            "metadata": {"name": "Bad_Name"},
            "spec": {"templates": [{"name": "main", "suspend": {}}]}
        }));
        let err = validate_template(&bad, &ManifestTemplateGetter::new("default")).unwrap_err();
        assert!(err.starts_with("metadata.name 'Bad_Name'"));
    }

    fn with_metadata(metadata: serde_json::Value) -> WorkflowTemplate {
        WorkflowTemplate::from_manifest(json!({
            "kind": "WorkflowTemplate",
            "metadata": metadata,
            "spec": {"templates": [{"name": "main", "suspend": {}}]}
        }))
    }

    #[test]
    fn test_trailing_dash_only_allowed_in_generate_name() {
        let getter = ManifestTemplateGetter::new("default");

        let named = with_metadata(json!({"name": "foo-"}));
        let err = validate_template(&named, &getter).unwrap_err();
        assert!(err.starts_with("metadata.name 'foo-'"));

        let generated = with_metadata(json!({"generateName": "foo-"}));
        assert_eq!(validate_template(&generated, &getter), Ok(()));

        let bad_prefix = with_metadata(json!({"generateName": "Foo-"}));
        let err = validate_template(&bad_prefix, &getter).unwrap_err();
        assert!(err.starts_with("metadata.generateName 'Foo-'"));
    }
}
