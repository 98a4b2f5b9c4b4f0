//! Per-template lint results and the append-only report that collects them.

use crate::error::{ErrorKind, LintError};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    Argument,
    Traversal,
    Parse,
    Validation,
    Transport,
    Config,
}

impl fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument => write!(f, "argument"),
            Self::Traversal => write!(f, "traversal"),
            Self::Parse => write!(f, "parse"),
            Self::Validation => write!(f, "validation"),
            Self::Transport => write!(f, "transport"),
            Self::Config => write!(f, "config"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFailure {
    pub path: PathBuf,
    pub template: Option<String>,
    pub origin: FailureOrigin,
    pub message: String,
}

impl LintFailure {
    pub fn from_error(path: &Path, template: Option<&str>, error: &LintError) -> Self {
        let origin = match error.kind() {
            ErrorKind::Argument => FailureOrigin::Argument,
            ErrorKind::Traversal => FailureOrigin::Traversal,
            ErrorKind::Parse => FailureOrigin::Parse,
            ErrorKind::Validation => FailureOrigin::Validation,
            ErrorKind::Transport => FailureOrigin::Transport,
            ErrorKind::Config => FailureOrigin::Config,
        };
        Self {
            path: path.to_path_buf(),
            template: template.map(str::to_string),
            origin,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for LintFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.origin, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    Passed {
        path: PathBuf,
        template: Option<String>,
    },
    Failed(LintFailure),
}

impl LintOutcome {
    pub fn passed(path: &Path, template: Option<&str>) -> Self {
        Self::Passed {
            path: path.to_path_buf(),
            template: template.map(str::to_string),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Passed { path, .. } => path,
            Self::Failed(failure) => &failure.path,
        }
    }
}

/// Outcomes in the order they were produced. Entries are never removed.
#[derive(Debug, Default, Clone)]
pub struct LintReport {
    outcomes: Vec<LintOutcome>,
}

impl LintReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: LintOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[LintOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &LintFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            LintOutcome::Failed(failure) => Some(failure),
            LintOutcome::Passed { .. } => None,
        })
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = LintReport::new();
        report.record(LintOutcome::passed(Path::new("a.yaml"), Some("a")));
        let err = LintError::parse("b.yaml", "bad indentation");
        report.record(LintOutcome::Failed(LintFailure::from_error(
            Path::new("b.yaml"),
            None,
            &err,
        )));
        assert_eq!(report.len(), 2);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.origin, FailureOrigin::Parse);
        assert_eq!(failure.path, PathBuf::from("b.yaml"));
        assert_eq!(report.outcomes()[1].path(), Path::new("b.yaml"));
    }

    #[test]
    fn test_failure_origin_from_rejection() {
        let err = LintError::Rejected {
            path: PathBuf::from("c.yaml"),
            status: 400,
            message: "spec.entrypoint template 'x' not found".into(),
        };
        let failure = LintFailure::from_error(Path::new("c.yaml"), Some("c"), &err);
        assert_eq!(failure.origin, FailureOrigin::Validation);
        assert!(failure.to_string().starts_with("validation error:"));
    }

    #[test]
    fn test_failure_origin_follows_error_kind() {
        let path = Path::new("d.yaml");
        let cases = [
            (LintError::NoPaths, FailureOrigin::Argument),
            (LintError::transport("connection reset"), FailureOrigin::Transport),
            (LintError::Config("bad kubeconfig".into()), FailureOrigin::Config),
            (
                LintError::validation(path, Some("d"), "no templates"),
                FailureOrigin::Validation,
            ),
        ];
        for (err, origin) in cases {
            assert_eq!(LintFailure::from_error(path, None, &err).origin, origin);
        }
    }
}
