use std::path::{Path, PathBuf};
use thiserror::Error;

/// Broad classification of a [`LintError`], used by the drivers to decide
/// whether a failure aborts the command or is recorded and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Traversal,
    Parse,
    Validation,
    Transport,
    Config,
}

#[derive(Error, Debug)]
pub enum LintError {
    #[error("no manifest paths given: expected a DIRECTORY or one or more FILEs")]
    NoPaths,

    #[error("Validation of a single directory supported (got directory {} plus {extra} more argument(s))", path.display())]
    SingleDirectoryOnly { path: PathBuf, extra: usize },

    #[error("Validate against a list of files or a single directory, not both ({} is a directory)", path.display())]
    MixedPaths { path: PathBuf },

    #[error("cannot access {}: {source}", path.display())]
    PathAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{}: {}: {message}", path.display(), template.as_deref().unwrap_or("<unnamed>"))]
    Validation {
        path: PathBuf,
        template: Option<String>,
        message: String,
    },

    #[error("{}: lint rejected by server ({status}): {message}", path.display())]
    Rejected {
        path: PathBuf,
        status: u16,
        message: String,
    },

    #[error("connection to lint service failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LintError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn validation(
        path: impl Into<PathBuf>,
        template: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            path: path.into(),
            template: template.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn transport_with_source(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoPaths
            | Self::SingleDirectoryOnly { .. }
            | Self::MixedPaths { .. }
            | Self::PathAccess { .. } => ErrorKind::Argument,
            Self::Traversal { .. } => ErrorKind::Traversal,
            Self::Read { .. } | Self::Parse { .. } => ErrorKind::Parse,
            Self::Validation { .. } | Self::Rejected { .. } => ErrorKind::Validation,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the remote driver must abort instead of recording the failure.
    pub fn is_fatal_remotely(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Parse | ErrorKind::Validation)
    }

    /// The manifest file this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SingleDirectoryOnly { path, .. }
            | Self::MixedPaths { path }
            | Self::PathAccess { path, .. }
            | Self::Traversal { path, .. }
            | Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Validation { path, .. }
            | Self::Rejected { path, .. } => Some(path),
            Self::NoPaths | Self::Transport { .. } | Self::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_errors_are_classified() {
        assert_eq!(LintError::NoPaths.kind(), ErrorKind::Argument);
        let err = LintError::SingleDirectoryOnly {
            path: PathBuf::from("templates"),
            extra: 2,
        };
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert!(err
            .to_string()
            .contains("Validation of a single directory supported"));
    }

    #[test]
    fn test_remote_fatality() {
        assert!(!LintError::parse("a.yaml", "bad").is_fatal_remotely());
        assert!(!LintError::validation("a.yaml", Some("t"), "bad").is_fatal_remotely());
        assert!(LintError::transport("connection refused").is_fatal_remotely());
        assert!(LintError::Config("bad".into()).is_fatal_remotely());
    }

    #[test]
    fn test_validation_message_names_file_and_template() {
        let err = LintError::validation("dir/b.yaml", Some("hello"), "spec.templates is empty");
        let msg = err.to_string();
        assert!(msg.contains("dir/b.yaml"));
        assert!(msg.contains("hello"));
        assert!(msg.contains("spec.templates is empty"));
        assert_eq!(err.path(), Some(Path::new("dir/b.yaml")));
    }
}
