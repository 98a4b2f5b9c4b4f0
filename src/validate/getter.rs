//! Resolution of `templateRef` targets during local validation

use super::manifest::{decode_templates, WorkflowTemplate};
use crate::lint::walker::DirectoryWalker;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Looks up other workflow templates by name.
pub trait WorkflowTemplateGetter: Send + Sync {
    fn get(&self, name: &str) -> Option<&WorkflowTemplate>;
}

/// An in-memory catalog of the workflow templates found in the manifests
/// being linted, restricted to one namespace.
///
/// Built once before validation starts. Files that cannot be read or parsed
/// are skipped here; the validator reports them when it reaches them.
#[derive(Debug, Default)]
pub struct ManifestTemplateGetter {
    namespace: String,
    templates: HashMap<String, WorkflowTemplate>,
}

impl ManifestTemplateGetter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            templates: HashMap::new(),
        }
    }

    /// Index every manifest under `dir` that directory traversal would visit.
    pub fn index_directory(namespace: impl Into<String>, dir: &Path) -> Self {
        let mut getter = Self::new(namespace);
        for entry in DirectoryWalker::new(dir).walk() {
            match entry {
                Ok(path) => getter.index_file(&path),
                Err(e) => {
                    debug!("Stopped indexing {}: {}", dir.display(), e);
                    break;
                }
            }
        }
        getter
    }

    /// Index an explicit list of manifest files.
    pub fn index_files(namespace: impl Into<String>, files: &[PathBuf]) -> Self {
        let mut getter = Self::new(namespace);
        for path in files {
            getter.index_file(path);
        }
        getter
    }

    fn index_file(&mut self, path: &Path) {
        let Ok(content) = std::fs::read_to_string(path) else {
            debug!("Skipping unreadable manifest {} while indexing", path.display());
            return;
        };
        match decode_templates(&content, false) {
            Ok(templates) => {
                for template in templates {
                    self.insert(template);
                }
            }
            Err(e) => debug!("Skipping {} while indexing: {}", path.display(), e),
        }
    }

    /// Add a template; templates pinned to another namespace are ignored.
    pub fn insert(&mut self, template: WorkflowTemplate) {
        if template.name().is_empty() {
            return;
        }
        if template.namespace().is_some_and(|ns| ns != self.namespace) {
            debug!(
                "Ignoring template {} from namespace {:?}",
                template.name(),
                template.namespace()
            );
            return;
        }
        self.templates.insert(template.name().to_string(), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl WorkflowTemplateGetter for ManifestTemplateGetter {
    fn get(&self, name: &str) -> Option<&WorkflowTemplate> {
        self.templates.get(name)
    }
}
