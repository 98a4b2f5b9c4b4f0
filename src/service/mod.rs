//! Remote lint service abstraction
//!
//! [`LintService`] is the seam the remote driver talks to. [`HttpLintService`]
//! reaches a workflow server's lint endpoint over HTTP; [`MockLintService`]
//! replays scripted responses in tests.

pub mod http;
pub mod mock;

pub use http::HttpLintService;
pub use mock::MockLintService;

use crate::error::Result;
use crate::validate::WorkflowTemplate;
use async_trait::async_trait;
use std::path::Path;

/// Submits one workflow template for server-side lint.
///
/// `Ok(())` is an acknowledgement. A rejection is returned as a
/// validation-kind error; an unusable connection as a transport-kind error.
#[async_trait]
pub trait LintService: Send + Sync {
    async fn lint(&self, namespace: &str, source: &Path, template: &WorkflowTemplate)
        -> Result<()>;
}
