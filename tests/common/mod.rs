//! Common test utilities and helpers

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wftlint::config::ClientConfig;
use wftlint::error::Result;
use wftlint::lint::DirectoryWalker;
use wftlint::validate::{
    ManifestTemplateGetter, Validator, WorkflowTemplate, WorkflowTemplateValidator,
};

/// A structurally valid workflow template manifest.
pub fn valid_template(name: &str) -> String {
    format!(
        r#"apiVersion: argoproj.io/v1alpha1
kind: WorkflowTemplate
metadata:
  name: {name}
spec:
  entrypoint: main
  templates:
    - name: main
      container:
        image: alpine:3.19
        command: [echo, hello]
"#
    )
}

/// Parses cleanly but names an entrypoint that does not exist.
pub fn invalid_template(name: &str) -> String {
    format!(
        r#"apiVersion: argoproj.io/v1alpha1
kind: WorkflowTemplate
metadata:
  name: {name}
spec:
  entrypoint: missing
  templates:
    - name: main
      container:
        image: alpine:3.19
"#
    )
}

pub const UNPARSABLE: &str = "kind: WorkflowTemplate\nspec: [unterminated\n";

/// Write `content` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn local_config() -> ClientConfig {
    ClientConfig {
        namespace: "argo".to_string(),
        ..ClientConfig::default()
    }
}

pub fn remote_config() -> ClientConfig {
    ClientConfig {
        server: Some("localhost:2746".to_string()),
        namespace: "argo".to_string(),
        ..ClientConfig::default()
    }
}

/// Wraps the real validator and records which files reach it.
pub struct RecordingValidator {
    inner: WorkflowTemplateValidator<ManifestTemplateGetter>,
    parsed: Mutex<Vec<PathBuf>>,
    linted: Mutex<Vec<PathBuf>>,
}

impl RecordingValidator {
    pub fn new() -> Self {
        Self {
            inner: WorkflowTemplateValidator::new(ManifestTemplateGetter::new("argo")),
            parsed: Mutex::new(Vec::new()),
            linted: Mutex::new(Vec::new()),
        }
    }

    pub fn parsed(&self) -> Vec<PathBuf> {
        self.parsed.lock().unwrap().clone()
    }

    pub fn linted(&self) -> Vec<PathBuf> {
        self.linted.lock().unwrap().clone()
    }

    pub fn untouched(&self) -> bool {
        self.parsed().is_empty() && self.linted().is_empty()
    }
}

impl Validator for RecordingValidator {
    fn parse_file(&self, path: &Path, strict: bool) -> Result<Vec<WorkflowTemplate>> {
        self.parsed.lock().unwrap().push(path.to_path_buf());
        self.inner.parse_file(path, strict)
    }

    fn lint_file(&self, path: &Path, strict: bool) -> Result<()> {
        self.linted.lock().unwrap().push(path.to_path_buf());
        self.inner.lint_file(path, strict)
    }

    fn lint_dir(&self, dir: &Path, strict: bool) -> Result<()> {
        for entry in DirectoryWalker::new(dir).walk() {
            self.lint_file(&entry?, strict)?;
        }
        Ok(())
    }
}
