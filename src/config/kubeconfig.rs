//! Namespace lookup from the user's kubeconfig.

use crate::error::{LintError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct KubeConfig {
    current_context: Option<String>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
}

#[derive(Debug, Default, Deserialize)]
struct NamedContext {
    name: String,
    #[serde(default)]
    context: ContextInfo,
}

#[derive(Debug, Default, Deserialize)]
struct ContextInfo {
    namespace: Option<String>,
}

/// The kubeconfig to read: the first entry of `KUBECONFIG`, else `~/.kube/config`.
pub fn kubeconfig_path() -> Option<PathBuf> {
    if let Some(value) = std::env::var_os("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

/// Namespace of the current context in the kubeconfig at `path`.
///
/// A missing file, an unset current context, or a context without a
/// namespace all yield `Ok(None)`.
pub fn current_namespace(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| {
        LintError::Config(format!("failed to read kubeconfig {}: {}", path.display(), e))
    })?;
    let config: KubeConfig = serde_yaml::from_str(&content).map_err(|e| {
        LintError::Config(format!("failed to parse kubeconfig {}: {}", path.display(), e))
    })?;

    let Some(current) = config.current_context else {
        return Ok(None);
    };
    Ok(config
        .contexts
        .into_iter()
        .find(|ctx| ctx.name == current)
        .and_then(|ctx| ctx.context.namespace)
        .filter(|ns| !ns.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
contexts:
  - name: prod
    context:
      cluster: prod
      namespace: production
  - name: dev
    context:
      cluster: dev
      namespace: argo
"#;

    #[test]
    fn test_current_context_namespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, KUBECONFIG).unwrap();
        assert_eq!(current_namespace(&path).unwrap(), Some("argo".to_string()));
    }

    #[test]
    fn test_context_without_namespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, KUBECONFIG.replace("      namespace: argo\n", "")).unwrap();
        assert_eq!(current_namespace(&path).unwrap(), None);
    }

    #[test]
    fn test_missing_kubeconfig() {
        let dir = TempDir::new().unwrap();
        assert_eq!(current_namespace(&dir.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn test_malformed_kubeconfig() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "contexts: {not: [a list").unwrap();
        let err = current_namespace(&path).unwrap_err();
        assert!(matches!(err, LintError::Config(_)));
    }
}
