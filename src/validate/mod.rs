//! In-process workflow template validation
//!
//! - `manifest` decodes YAML/JSON manifest files into [`WorkflowTemplate`]s
//! - `rules` checks a template's structure
//! - `getter` resolves `templateRef`s against the other manifests being linted

pub mod getter;
pub mod manifest;
pub mod rules;
pub mod spec;

pub use getter::{ManifestTemplateGetter, WorkflowTemplateGetter};
pub use manifest::WorkflowTemplate;

use crate::error::{LintError, Result};
use crate::lint::walker::DirectoryWalker;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// The validation capability the lint drivers are written against.
pub trait Validator: Send + Sync {
    /// Parse a manifest file into the workflow templates it defines.
    fn parse_file(&self, path: &Path, strict: bool) -> Result<Vec<WorkflowTemplate>>;

    /// Parse and validate every template in one file.
    fn lint_file(&self, path: &Path, strict: bool) -> Result<()>;

    /// Validate every manifest under a directory, stopping at the first failure.
    fn lint_dir(&self, dir: &Path, strict: bool) -> Result<()>;
}

/// Validates workflow templates against the structural rules in [`rules`].
pub struct WorkflowTemplateValidator<G: WorkflowTemplateGetter> {
    getter: G,
}

impl<G: WorkflowTemplateGetter> WorkflowTemplateValidator<G> {
    pub fn new(getter: G) -> Self {
        Self { getter }
    }

    pub fn getter(&self) -> &G {
        &self.getter
    }

    /// Validate a single already-parsed template.
    pub fn validate(&self, path: &Path, template: &WorkflowTemplate) -> Result<()> {
        rules::validate_template(template, &self.getter).map_err(|message| {
            let name = Some(template.name()).filter(|n| !n.is_empty());
            LintError::validation(path, name, message)
        })
    }
}

impl<G: WorkflowTemplateGetter> Validator for WorkflowTemplateValidator<G> {
    fn parse_file(&self, path: &Path, strict: bool) -> Result<Vec<WorkflowTemplate>> {
        let content = fs::read_to_string(path).map_err(|source| LintError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let templates = manifest::decode_templates(&content, strict)
            .map_err(|message| LintError::parse(path, message))?;
        trace!("Parsed {} template(s) from {}", templates.len(), path.display());
        Ok(templates)
    }

    fn lint_file(&self, path: &Path, strict: bool) -> Result<()> {
        let templates = self.parse_file(path, strict)?;
        if templates.is_empty() {
            debug!("No workflow templates in {}", path.display());
        }
        for template in &templates {
            self.validate(path, template)?;
            debug!("Validated {} in {}", template.name(), path.display());
        }
        Ok(())
    }

    fn lint_dir(&self, dir: &Path, strict: bool) -> Result<()> {
        for entry in DirectoryWalker::new(dir).walk() {
            self.lint_file(&entry?, strict)?;
        }
        Ok(())
    }
}
