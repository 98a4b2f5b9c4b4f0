//! Manifest decoding: YAML streams and JSON documents into workflow templates

use serde::Deserialize;
use serde_json::{Map, Value};

pub const WORKFLOW_TEMPLATE_KIND: &str = "WorkflowTemplate";

const MANIFEST_FIELDS: &[&str] = &["apiVersion", "kind", "metadata", "spec"];

const METADATA_FIELDS: &[&str] = &[
    "name",
    "generateName",
    "namespace",
    "labels",
    "annotations",
    "uid",
    "resourceVersion",
    "generation",
    "creationTimestamp",
    "deletionTimestamp",
    "deletionGracePeriodSeconds",
    "ownerReferences",
    "finalizers",
    "managedFields",
    "selfLink",
];

const SPEC_FIELDS: &[&str] = &[
    "templates",
    "entrypoint",
    "arguments",
    "serviceAccountName",
    "automountServiceAccountToken",
    "executor",
    "volumes",
    "volumeClaimTemplates",
    "parallelism",
    "artifactRepositoryRef",
    "suspend",
    "nodeSelector",
    "affinity",
    "tolerations",
    "imagePullSecrets",
    "hostNetwork",
    "dnsPolicy",
    "dnsConfig",
    "onExit",
    "ttlStrategy",
    "activeDeadlineSeconds",
    "priority",
    "schedulerName",
    "podGC",
    "podPriorityClassName",
    "podPriority",
    "hostAliases",
    "securityContext",
    "podSpecPatch",
    "podDisruptionBudget",
    "metrics",
    "shutdown",
    "workflowTemplateRef",
    "synchronization",
    "volumeClaimGC",
    "retryStrategy",
    "podMetadata",
    "templateDefaults",
    "archiveLogs",
    "hooks",
    "workflowMetadata",
    "artifactGC",
];

const TEMPLATE_FIELDS: &[&str] = &[
    "name",
    "inputs",
    "outputs",
    "nodeSelector",
    "affinity",
    "metadata",
    "daemon",
    "steps",
    "container",
    "containerSet",
    "script",
    "resource",
    "dag",
    "suspend",
    "data",
    "http",
    "plugin",
    "volumes",
    "initContainers",
    "sidecars",
    "archiveLocation",
    "activeDeadlineSeconds",
    "retryStrategy",
    "parallelism",
    "failFast",
    "tolerations",
    "schedulerName",
    "priorityClassName",
    "priority",
    "serviceAccountName",
    "automountServiceAccountToken",
    "executor",
    "hostAliases",
    "securityContext",
    "podSpecPatch",
    "metrics",
    "synchronization",
    "memoize",
    "timeout",
];

const STEP_FIELDS: &[&str] = &[
    "name",
    "template",
    "inline",
    "arguments",
    "templateRef",
    "withItems",
    "withParam",
    "withSequence",
    "when",
    "continueOn",
    "onExit",
    "hooks",
];

const TASK_FIELDS: &[&str] = &[
    "name",
    "template",
    "inline",
    "arguments",
    "templateRef",
    "dependencies",
    "depends",
    "withItems",
    "withParam",
    "withSequence",
    "when",
    "continueOn",
    "onExit",
    "hooks",
];

/// A parsed workflow template manifest.
///
/// The body is kept as the full manifest so it can be forwarded verbatim to a
/// remote lint service; typed views are derived on demand by the rules.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    name: String,
    generated_name: bool,
    namespace: Option<String>,
    manifest: Value,
}

impl WorkflowTemplate {
    pub fn from_manifest(manifest: Value) -> Self {
        let metadata = manifest.get("metadata");
        let field = |key: &str| {
            metadata
                .and_then(|m| m.get(key))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (name, generated_name) = match field("name") {
            Some(name) => (name, false),
            None => (field("generateName").unwrap_or_default(), true),
        };
        let namespace = field("namespace");
        Self {
            name,
            generated_name,
            namespace,
            manifest,
        }
    }

    /// `metadata.name`, falling back to `metadata.generateName`; empty if neither is set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether [`name`](Self::name) is a `generateName` prefix.
    pub fn is_generated_name(&self) -> bool {
        self.generated_name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn manifest(&self) -> &Value {
        &self.manifest
    }

    pub fn spec(&self) -> Option<&Value> {
        self.manifest.get("spec")
    }
}

/// Decode the contents of one manifest file into workflow templates.
///
/// Documents of any other kind are skipped. `Err` carries a human-readable
/// parse message.
pub fn decode_templates(content: &str, strict: bool) -> Result<Vec<WorkflowTemplate>, String> {
    // A leading '{' may also be a YAML flow mapping
    let documents = match looks_like_json(content)
        .then(|| serde_json::from_str::<Value>(content).ok())
        .flatten()
    {
        Some(doc) => vec![doc],
        None => decode_yaml_stream(content)?,
    };

    let mut templates = Vec::new();
    for doc in documents {
        if doc.get("kind").and_then(Value::as_str) != Some(WORKFLOW_TEMPLATE_KIND) {
            continue;
        }
        if strict {
            check_known_fields(&doc)?;
        }
        templates.push(WorkflowTemplate::from_manifest(doc));
    }
    Ok(templates)
}

fn decode_yaml_stream(content: &str) -> Result<Vec<Value>, String> {
    let mut docs = Vec::new();
    for (idx, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let doc = Value::deserialize(document).map_err(|e| format!("document {}: {}", idx + 1, e))?;
        if !doc.is_null() {
            docs.push(doc);
        }
    }
    Ok(docs)
}

fn looks_like_json(content: &str) -> bool {
    content.trim_start().starts_with('{')
}

/// Reject fields the workflow template schema does not define.
fn check_known_fields(doc: &Value) -> Result<(), String> {
    let Some(root) = doc.as_object() else {
        return Ok(());
    };
    check_object(root, MANIFEST_FIELDS, "")?;
    if let Some(metadata) = root.get("metadata").and_then(Value::as_object) {
        check_object(metadata, METADATA_FIELDS, "metadata.")?;
    }
    let Some(spec) = root.get("spec").and_then(Value::as_object) else {
        return Ok(());
    };
    check_object(spec, SPEC_FIELDS, "spec.")?;

    let templates = spec.get("templates").and_then(Value::as_array);
    for (t_idx, template) in templates.into_iter().flatten().enumerate() {
        let Some(template) = template.as_object() else {
            continue;
        };
        let prefix = format!("spec.templates[{t_idx}].");
        check_object(template, TEMPLATE_FIELDS, &prefix)?;

        let groups = template.get("steps").and_then(Value::as_array);
        for (g_idx, group) in groups.into_iter().flatten().enumerate() {
            for (s_idx, step) in group.as_array().into_iter().flatten().enumerate() {
                if let Some(step) = step.as_object() {
                    let prefix = format!("{prefix}steps[{g_idx}][{s_idx}].");
                    check_object(step, STEP_FIELDS, &prefix)?;
                }
            }
        }

        let tasks = template
            .get("dag")
            .and_then(|dag| dag.get("tasks"))
            .and_then(Value::as_array);
        for (k_idx, task) in tasks.into_iter().flatten().enumerate() {
            if let Some(task) = task.as_object() {
                let prefix = format!("{prefix}dag.tasks[{k_idx}].");
                check_object(task, TASK_FIELDS, &prefix)?;
            }
        }
    }
    Ok(())
}

fn check_object(object: &Map<String, Value>, known: &[&str], prefix: &str) -> Result<(), String> {
    match object.keys().find(|key| !known.contains(&key.as_str())) {
        Some(key) => Err(format!("unknown field \"{prefix}{key}\"")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = r#"
apiVersion: argoproj.io/v1alpha1
kind: WorkflowTemplate
metadata:
  name: hello
spec:
  entrypoint: main
  templates:
    - name: main
      container:
        image: alpine
"#;

    #[test]
    fn test_decode_single_yaml_template() {
        let templates = decode_templates(HELLO, true).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name(), "hello");
        assert_eq!(templates[0].namespace(), None);
        assert!(templates[0].spec().is_some());
    }

    #[test]
    fn test_multi_document_stream_skips_other_kinds() {
        let content = format!(
            "{HELLO}\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm\n---\n{}",
            HELLO.replace("name: hello", "name: second")
        );
        let templates = decode_templates(&content, true).unwrap();
        let names: Vec<_> = templates.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["hello", "second"]);
    }

    #[test]
    fn test_empty_documents_are_ignored() {
        let content = format!("---\n---\n{HELLO}");
        assert_eq!(decode_templates(&content, true).unwrap().len(), 1);
        assert!(decode_templates("", true).unwrap().is_empty());
    }

    #[test]
    fn test_json_document() {
        let content = r#"{"apiVersion":"argoproj.io/v1alpha1","kind":"WorkflowTemplate",
            "metadata":{"generateName":"gen-","namespace":"argo"},
            "spec":{"templates":[{"name":"main","suspend":{}}]}}"#;
        let templates = decode_templates(content, true).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name(), "gen-");
        assert_eq!(templates[0].namespace(), Some("argo"));
    }

    #[test]
    fn test_flow_mapping_yaml_document() {
        let content = "{kind: WorkflowTemplate, metadata: {name: flow}, spec: {templates: [{name: main, suspend: {}}]}}";
        let templates = decode_templates(content, true).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name(), "flow");
    }

    #[test]
    fn test_unparsable_brace_document_is_an_error() {
        assert!(decode_templates("{kind: [", true).is_err());
    }

    #[test]
    fn test_generate_name_is_flagged() {
        let content = HELLO.replace("name: hello", "generateName: hello-");
        let templates = decode_templates(&content, true).unwrap();
        assert_eq!(templates[0].name(), "hello-");
        assert!(templates[0].is_generated_name());
        assert!(!decode_templates(HELLO, true).unwrap()[0].is_generated_name());
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let err = decode_templates("kind: WorkflowTemplate\nspec: [unclosed", true).unwrap_err();
        assert!(err.contains("document 1"));
    }

    #[test]
    fn test_strict_rejects_unknown_template_field() {
        let content = HELLO.replace("container:", "contaner:");
        let err = decode_templates(&content, true).unwrap_err();
        assert_eq!(err, "unknown field \"spec.templates[0].contaner\"");
        assert_eq!(decode_templates(&content, false).unwrap().len(), 1);
    }

    #[test]
    fn test_strict_rejects_unknown_step_field() {
        let content = r#"
kind: WorkflowTemplate
metadata:
  name: steps
spec:
  templates:
    - name: main
      steps:
        - - name: a
            template: main
            tmeplate: oops
"#;
        let err = decode_templates(content, true).unwrap_err();
        assert!(err.contains("spec.templates[0].steps[0][0].tmeplate"));
    }
}
