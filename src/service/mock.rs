//! Scripted lint service for tests

use super::LintService;
use crate::error::{LintError, Result};
use crate::validate::WorkflowTemplate;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A submitted lint call: namespace, source file and template name.
pub type LintCall = (String, PathBuf, String);

/// Records every call and answers from a per-template script.
///
/// Templates without a scripted answer are acknowledged.
#[derive(Clone, Default)]
pub struct MockLintService {
    rejections: Arc<Mutex<HashMap<String, String>>>,
    transport_failures: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<LintCall>>>,
}

impl MockLintService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the template with this name, as a server would an invalid one.
    pub async fn reject(&self, template: &str, message: &str) {
        self.rejections
            .lock()
            .await
            .insert(template.to_string(), message.to_string());
    }

    /// Fail the call for this template as if the connection broke.
    pub async fn fail_transport(&self, template: &str) {
        self.transport_failures
            .lock()
            .await
            .insert(template.to_string());
    }

    pub async fn calls(&self) -> Vec<LintCall> {
        self.calls.lock().await.clone()
    }

    pub async fn linted_templates(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(_, _, name)| name.clone())
            .collect()
    }
}

#[async_trait]
impl LintService for MockLintService {
    async fn lint(
        &self,
        namespace: &str,
        source: &Path,
        template: &WorkflowTemplate,
    ) -> Result<()> {
        let name = template.name().to_string();
        self.calls
            .lock()
            .await
            .push((namespace.to_string(), source.to_path_buf(), name.clone()));

        if self.transport_failures.lock().await.contains(&name) {
            return Err(LintError::transport("connection reset by peer"));
        }
        if let Some(message) = self.rejections.lock().await.get(&name) {
            return Err(LintError::Rejected {
                path: source.to_path_buf(),
                status: 400,
                message: message.clone(),
            });
        }
        Ok(())
    }
}
