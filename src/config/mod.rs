//! Client configuration: the active namespace and the remote lint server.
//!
//! Resolved once at startup and passed by reference; nothing re-reads the
//! environment after that.

pub mod kubeconfig;

use crate::error::{LintError, Result};
use tracing::debug;
use url::Url;

pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` or a full URL. `None` means validation happens locally.
    pub server: Option<String>,
    pub namespace: String,
    pub token: Option<String>,
    /// Use https for a bare `host:port` server.
    pub secure: bool,
    pub insecure_skip_verify: bool,
    /// Path prefix the server is mounted under.
    pub base_href: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            token: None,
            secure: false,
            insecure_skip_verify: false,
            base_href: String::new(),
        }
    }
}

impl ClientConfig {
    pub fn is_remote(&self) -> bool {
        self.server.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Base URL of the lint server, with the base href applied and a trailing
    /// slash so API paths can be joined onto it.
    pub fn base_url(&self) -> Result<Url> {
        let server = self
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LintError::Config("no lint server configured".to_string()))?;

        let raw = if server.contains("://") {
            server.to_string()
        } else {
            let scheme = if self.secure { "https" } else { "http" };
            format!("{scheme}://{server}")
        };
        let mut url = Url::parse(&raw)
            .map_err(|e| LintError::Config(format!("invalid server address '{server}': {e}")))?;

        let mut path = url.path().trim_end_matches('/').to_string();
        let href = self.base_href.trim_matches('/');
        if !href.is_empty() {
            path.push('/');
            path.push_str(href);
        }
        path.push('/');
        url.set_path(&path);
        Ok(url)
    }

    /// Resolve the namespace: an explicit value wins, then the kubeconfig's
    /// current context, then [`DEFAULT_NAMESPACE`].
    pub fn resolve_namespace(explicit: Option<String>) -> Result<String> {
        if let Some(ns) = explicit.filter(|ns| !ns.is_empty()) {
            return Ok(ns);
        }
        if let Some(path) = kubeconfig::kubeconfig_path() {
            if let Some(ns) = kubeconfig::current_namespace(&path)? {
                debug!("Using namespace {} from {}", ns, path.display());
                return Ok(ns);
            }
        }
        Ok(DEFAULT_NAMESPACE.to_string())
    }
}
