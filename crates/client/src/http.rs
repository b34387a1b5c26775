//! Request plumbing shared by every endpoint.
//!
//! Each call is a single awaited request: no retries and no timeout beyond the
//! transport defaults. Non-success statuses are mapped onto [`ClientError`]; a 401
//! clears the token store before the error is returned.

use crate::session::TokenStore;
use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Error body the backend sends (`message` from the API, `msg` from the JWT layer).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "msg")]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, serde_json::Value>>,
}

/// Body of delete and other message-only responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

fn field_messages(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(s) => vec![s],
        serde_json::Value::Array(items) => items.into_iter().flat_map(field_messages).collect(),
        serde_json::Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Typed client for the backend REST surface.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url().clone(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn is_logged_in(&self) -> ClientResult<bool> {
        Ok(self.tokens.load()?.is_some())
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid request path '{path}': {e}")))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response> {
        let url = self.url(path)?;
        tracing::debug!(%method, path, "backend request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = self.tokens.load()? {
            request = request.header(reqwest::header::AUTHORIZATION, token.bearer());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "backend response");

        if status.is_success() {
            return Ok(response);
        }
        Err(self.error_from(status, response).await)
    }

    async fn error_from(&self, status: StatusCode, response: reqwest::Response) -> ClientError {
        let body: ErrorBody = match response.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(e) => return ClientError::Transport(e),
        };

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!("backend rejected credentials; clearing session");
                if let Err(e) = self.tokens.clear() {
                    tracing::error!("failed to clear token store: {}", e);
                }
                ClientError::Unauthorized
            }
            StatusCode::NOT_FOUND => ClientError::NotFound(
                body.message
                    .unwrap_or_else(|| "resource not found".to_string()),
            ),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                let fields: BTreeMap<String, Vec<String>> = body
                    .errors
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(field, value)| (field, field_messages(value)))
                    .collect();
                ClientError::Conflict {
                    status: status.as_u16(),
                    message: body.message.unwrap_or_else(|| {
                        "the request conflicts with data already recorded".to_string()
                    }),
                    fields,
                }
            }
            _ => ClientError::Api {
                status: status.as_u16(),
                message: body
                    .message
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            },
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(ClientError::Decode)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        Self::decode(response).await
    }

    /// DELETE and return the backend's confirmation message, if any.
    pub(crate) async fn delete(&self, path: &str) -> ClientResult<Option<String>> {
        let response = self.send::<()>(Method::DELETE, path, None).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<MessageBody>(&text)
            .map(|body| body.message)
            .unwrap_or(None))
    }
}
