//! HTTP client for a workflow server's template lint endpoint

use super::LintService;
use crate::config::ClientConfig;
use crate::error::{LintError, Result};
use crate::validate::WorkflowTemplate;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};
use url::Url;

const VERSION_PATH: &str = "api/v1/version";

#[derive(Debug, Serialize)]
struct LintRequest<'a> {
    namespace: &'a str,
    template: &'a serde_json::Value,
}

/// Error body returned by the server, e.g. `{"code": 3, "message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// A verified connection to a lint server.
///
/// Holding the value keeps the connection pool alive; dropping it releases
/// the connections on every exit path.
pub struct HttpLintService {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpLintService {
    /// Build the client and confirm the server answers before any template
    /// is submitted.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()
            .map_err(|e| LintError::transport_with_source("failed to create HTTP client", e))?;

        let service = Self {
            client,
            base_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
        };
        service.handshake().await?;
        Ok(service)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn handshake(&self) -> Result<()> {
        let url = self.endpoint(VERSION_PATH)?;
        debug!("Connecting to lint server at {}", self.base_url);
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| {
                LintError::transport_with_source(format!("cannot reach {}", self.base_url), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(LintError::transport(format!(
                "server at {} answered {}: {}",
                self.base_url, status, message
            )));
        }
        trace!("Lint server handshake succeeded");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| LintError::Config(format!("invalid endpoint path '{path}': {e}")))
    }

    fn lint_endpoint(&self, namespace: &str) -> Result<Url> {
        let mut url = self.endpoint("api/v1/workflow-templates/")?;
        url.path_segments_mut()
            .map_err(|_| LintError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(namespace)
            .push("lint");
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) if token.starts_with("Bearer ") => {
                request.header(reqwest::header::AUTHORIZATION, token)
            }
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl LintService for HttpLintService {
    async fn lint(
        &self,
        namespace: &str,
        source: &Path,
        template: &WorkflowTemplate,
    ) -> Result<()> {
        let url = self.lint_endpoint(namespace)?;
        let body = LintRequest {
            namespace,
            template: template.manifest(),
        };
        trace!("POST {} for template {}", url, template.name());

        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LintError::transport_with_source("lint request failed", e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = error_message(response).await;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LintError::transport(
                format!("server refused credentials ({status}): {message}"),
            )),
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                Err(LintError::transport(format!(
                    "server unavailable ({status}): {message}"
                )))
            }
            _ => Err(LintError::Rejected {
                path: source.to_path_buf(),
                status: status.as_u16(),
                message,
            }),
        }
    }
}

async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(text)
}
