//! Turning a manifest path into workflow templates.

use super::outcome::LintFailure;
use crate::validate::{Validator, WorkflowTemplate};
use std::path::Path;

/// Parses manifest files through the [`Validator`] for either driver, so a
/// file yields the same template set regardless of where it is linted.
pub struct TemplateSource<'a> {
    validator: &'a dyn Validator,
    strict: bool,
}

impl<'a> TemplateSource<'a> {
    pub fn new(validator: &'a dyn Validator, strict: bool) -> Self {
        Self { validator, strict }
    }

    /// Load the templates defined in `path`. Parse failures are returned as a
    /// [`LintFailure`]; whether they abort is the caller's decision.
    pub fn load(&self, path: &Path) -> Result<Vec<WorkflowTemplate>, LintFailure> {
        self.validator
            .parse_file(path, self.strict)
            .map_err(|e| LintFailure::from_error(path, None, &e))
    }
}
