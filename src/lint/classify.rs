//! Path argument classification: one directory or an explicit file list.

use crate::error::{LintError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The manifest paths one invocation lints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSet {
    /// A single directory, traversed recursively with extension filtering.
    Directory(PathBuf),
    /// Explicitly named files, linted in the given order without filtering.
    Files(Vec<PathBuf>),
}

impl PathSet {
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

/// Classify raw path arguments. Only filesystem stat calls are made.
pub fn classify(paths: &[PathBuf]) -> Result<PathSet> {
    let Some(first) = paths.first() else {
        return Err(LintError::NoPaths);
    };

    if is_dir(first)? {
        if paths.len() > 1 {
            return Err(LintError::SingleDirectoryOnly {
                path: first.clone(),
                extra: paths.len() - 1,
            });
        }
        return Ok(PathSet::Directory(first.clone()));
    }

    for path in paths {
        if is_dir(path)? {
            return Err(LintError::MixedPaths { path: path.clone() });
        }
    }
    Ok(PathSet::Files(paths.to_vec()))
}

fn is_dir(path: &Path) -> Result<bool> {
    fs::metadata(path)
        .map(|meta| meta.is_dir())
        .map_err(|source| LintError::PathAccess {
            path: path.to_path_buf(),
            source,
        })
}
