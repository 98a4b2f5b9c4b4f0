//! Lint orchestration
//!
//! The [`ModeSelector`] classifies the path arguments once, picks one
//! [`LintPlan`] out of {local, remote} × {directory, file list}, runs the
//! matching driver and reports the final status:
//!
//! - local lint is fail-fast: the first parse or validation failure aborts
//! - remote lint is continue-on-error: failures are logged, the command succeeds
//!
//! Both drivers parse manifests through the same [`TemplateSource`].

pub mod classify;
pub mod local;
pub mod outcome;
pub mod remote;
pub mod source;
pub mod walker;

pub use classify::{classify, PathSet};
pub use local::LocalLintDriver;
pub use outcome::{FailureOrigin, LintFailure, LintOutcome, LintReport};
pub use remote::RemoteLintDriver;
pub use source::TemplateSource;
pub use walker::DirectoryWalker;

use crate::config::ClientConfig;
use crate::error::{LintError, Result};
use crate::service::{HttpLintService, LintService};
use crate::validate::{ManifestTemplateGetter, Validator, WorkflowTemplateValidator};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const CONFIRMATION: &str = "Workflow manifests validated";

/// The resolved inputs of one `lint` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintInvocation {
    paths: Vec<PathBuf>,
    strict: bool,
    remote: bool,
    namespace: String,
}

impl LintInvocation {
    pub fn new(paths: Vec<PathBuf>, strict: bool, config: &ClientConfig) -> Self {
        Self {
            paths,
            strict,
            remote: config.is_remote(),
            namespace: config.namespace.clone(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn remote(&self) -> bool {
        self.remote
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Where validation happens and what it covers, chosen once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintPlan {
    LocalDirectory(PathBuf),
    LocalFiles(Vec<PathBuf>),
    RemoteDirectory(PathBuf),
    RemoteFiles(Vec<PathBuf>),
}

impl LintPlan {
    pub fn select(invocation: &LintInvocation) -> Result<Self> {
        let plan = match (invocation.remote(), classify(invocation.paths())?) {
            (false, PathSet::Directory(dir)) => Self::LocalDirectory(dir),
            (false, PathSet::Files(files)) => Self::LocalFiles(files),
            (true, PathSet::Directory(dir)) => Self::RemoteDirectory(dir),
            (true, PathSet::Files(files)) => Self::RemoteFiles(files),
        };
        Ok(plan)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteDirectory(_) | Self::RemoteFiles(_))
    }
}

/// Progress of a [`ModeSelector`]. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintPhase {
    Idle,
    Classified,
    Executing,
    Reported,
}

pub struct ModeSelector<'a> {
    invocation: &'a LintInvocation,
    config: &'a ClientConfig,
    phase: LintPhase,
}

impl<'a> ModeSelector<'a> {
    pub fn new(invocation: &'a LintInvocation, config: &'a ClientConfig) -> Self {
        Self {
            invocation,
            config,
            phase: LintPhase::Idle,
        }
    }

    pub fn phase(&self) -> LintPhase {
        self.phase
    }

    /// Run with the in-process validator, connecting to the lint server
    /// first when the plan is remote.
    pub async fn run(mut self) -> Result<LintReport> {
        let plan = self.classify()?;
        let namespace = self.invocation.namespace();
        match &plan {
            LintPlan::LocalDirectory(dir) => {
                let getter = ManifestTemplateGetter::index_directory(namespace, dir);
                self.execute(&plan, &WorkflowTemplateValidator::new(getter), None)
                    .await
            }
            LintPlan::LocalFiles(files) => {
                let getter = ManifestTemplateGetter::index_files(namespace, files);
                self.execute(&plan, &WorkflowTemplateValidator::new(getter), None)
                    .await
            }
            LintPlan::RemoteDirectory(_) | LintPlan::RemoteFiles(_) => {
                let service = HttpLintService::connect(self.config).await?;
                let validator = WorkflowTemplateValidator::new(ManifestTemplateGetter::new(namespace));
                self.execute(&plan, &validator, Some(&service)).await
            }
        }
    }

    /// Run against caller-supplied collaborators.
    pub async fn run_with(
        mut self,
        validator: &dyn Validator,
        service: Option<&dyn LintService>,
    ) -> Result<LintReport> {
        let plan = self.classify()?;
        self.execute(&plan, validator, service).await
    }

    fn classify(&mut self) -> Result<LintPlan> {
        let plan = LintPlan::select(self.invocation)?;
        debug!("Selected lint plan {:?}", plan);
        self.advance(LintPhase::Classified);
        Ok(plan)
    }

    async fn execute(
        &mut self,
        plan: &LintPlan,
        validator: &dyn Validator,
        service: Option<&dyn LintService>,
    ) -> Result<LintReport> {
        self.advance(LintPhase::Executing);
        let strict = self.invocation.strict();
        let report = match plan {
            LintPlan::LocalDirectory(dir) => {
                println!(
                    "Verifying all workflow template manifests in directory: {}",
                    dir.display()
                );
                LocalLintDriver::new(validator, strict).lint_directory(dir)?
            }
            LintPlan::LocalFiles(files) => {
                LocalLintDriver::new(validator, strict).lint_files(files)?
            }
            LintPlan::RemoteDirectory(dir) => {
                self.remote_driver(validator, service)?
                    .lint_directory(dir)
                    .await?
            }
            LintPlan::RemoteFiles(files) => {
                self.remote_driver(validator, service)?
                    .lint_files(files)
                    .await?
            }
        };
        self.report(&report);
        Ok(report)
    }

    fn remote_driver<'s>(
        &'s self,
        validator: &'s dyn Validator,
        service: Option<&'s dyn LintService>,
    ) -> Result<RemoteLintDriver<'s>> {
        let service =
            service.ok_or_else(|| LintError::transport("no connection to the lint service"))?;
        let source = TemplateSource::new(validator, self.invocation.strict());
        Ok(RemoteLintDriver::new(
            source,
            service,
            self.invocation.namespace(),
        ))
    }

    fn report(&mut self, report: &LintReport) {
        self.advance(LintPhase::Reported);
        let failed = report.failed_count();
        if failed > 0 {
            warn!(
                "{} of {} lint check(s) failed; see the errors above",
                failed,
                report.len()
            );
        } else {
            info!("{} lint check(s) passed", report.passed_count());
        }
        println!("{CONFIRMATION}");
    }

    fn advance(&mut self, next: LintPhase) {
        debug_assert!(next > self.phase, "lint phase moved from {:?} to {:?}", self.phase, next);
        debug!("Lint phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}
