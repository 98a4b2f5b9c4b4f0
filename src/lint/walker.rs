//! Directory traversal for manifest discovery.

use crate::error::{LintError, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions visited during directory traversal. Matching is exact and
/// case-sensitive.
pub const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Recursively yields manifest files under a root directory.
pub struct DirectoryWalker {
    root: PathBuf,
}

impl DirectoryWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree in file-name order, yielding each manifest file once.
    ///
    /// An unreadable directory yields an `Err`; callers are expected to stop
    /// at the first one.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if is_manifest(&entry) => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(source) => Some(Err(LintError::Traversal {
                    path: source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone()),
                    source,
                })),
            })
    }
}

fn is_manifest(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
    is_file && has_manifest_extension(entry.path())
}

pub fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
}
