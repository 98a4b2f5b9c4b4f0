//! Server-side linting with continue-on-error semantics.

use super::outcome::{LintFailure, LintOutcome, LintReport};
use super::source::TemplateSource;
use super::walker::DirectoryWalker;
use crate::error::Result;
use crate::service::LintService;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Parses each manifest locally and submits every template to the lint
/// service, one call per template.
///
/// Parse failures and rejected templates are logged and recorded, and the
/// driver moves on. Only transport faults and traversal errors abort.
pub struct RemoteLintDriver<'a> {
    source: TemplateSource<'a>,
    service: &'a dyn LintService,
    namespace: &'a str,
}

impl<'a> RemoteLintDriver<'a> {
    pub fn new(source: TemplateSource<'a>, service: &'a dyn LintService, namespace: &'a str) -> Self {
        Self {
            source,
            service,
            namespace,
        }
    }

    pub async fn lint_directory(&self, dir: &Path) -> Result<LintReport> {
        let mut report = LintReport::new();
        for entry in DirectoryWalker::new(dir).walk() {
            let path = entry?;
            self.lint_path(&path, &mut report).await?;
        }
        Ok(report)
    }

    pub async fn lint_files(&self, files: &[PathBuf]) -> Result<LintReport> {
        let mut report = LintReport::new();
        for path in files {
            self.lint_path(path, &mut report).await?;
        }
        Ok(report)
    }

    async fn lint_path(&self, path: &Path, report: &mut LintReport) -> Result<()> {
        let templates = match self.source.load(path) {
            Ok(templates) => templates,
            Err(failure) => {
                error!("{}", failure.message);
                report.record(LintOutcome::Failed(failure));
                return Ok(());
            }
        };

        for template in &templates {
            let name = Some(template.name()).filter(|n| !n.is_empty());
            match self.service.lint(self.namespace, path, template).await {
                Ok(()) => {
                    debug!("{} in {} passed remote lint", template.name(), path.display());
                    report.record(LintOutcome::passed(path, name));
                }
                Err(e) if e.is_fatal_remotely() => return Err(e),
                Err(e) => {
                    error!("{}", e);
                    report.record(LintOutcome::Failed(LintFailure::from_error(path, name, &e)));
                }
            }
        }
        Ok(())
    }
}
