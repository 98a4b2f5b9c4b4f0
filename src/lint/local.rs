//! In-process linting with fail-fast semantics.

use super::outcome::{LintOutcome, LintReport};
use crate::error::Result;
use crate::validate::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lints through the [`Validator`] only; never touches the network.
///
/// The first failure is returned as the error and nothing after it is checked.
pub struct LocalLintDriver<'a> {
    validator: &'a dyn Validator,
    strict: bool,
}

impl<'a> LocalLintDriver<'a> {
    pub fn new(validator: &'a dyn Validator, strict: bool) -> Self {
        Self { validator, strict }
    }

    /// Hand the whole tree to the validator's directory routine in one call.
    pub fn lint_directory(&self, dir: &Path) -> Result<LintReport> {
        debug!("Linting directory {} in-process", dir.display());
        self.validator.lint_dir(dir, self.strict)?;
        let mut report = LintReport::new();
        report.record(LintOutcome::passed(dir, None));
        Ok(report)
    }

    pub fn lint_files(&self, files: &[PathBuf]) -> Result<LintReport> {
        let mut report = LintReport::new();
        for file in files {
            self.validator.lint_file(file, self.strict)?;
            info!("{} is valid", file.display());
            report.record(LintOutcome::passed(file, None));
        }
        Ok(report)
    }
}
