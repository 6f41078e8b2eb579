//! HTTP gateway for backend API calls
//!
//! The [`ApiGateway`] trait is the transport seam: stores, the session
//! manager and the order workflow all speak JSON through it and never
//! see reqwest. [`HttpGateway`] is the production implementation.

use async_trait::async_trait;
use http::Method;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{ApiError, ApiResult, ClientConfig};

/// Transport contract consumed by every component in this crate.
///
/// Timeouts, cookies and TLS live entirely behind this trait; nothing
/// above it retries or schedules.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Perform one request against the backend and decode the JSON body.
    /// Empty bodies decode as `Value::Null`.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value>;

    async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> ApiResult<Value> {
        self.request(Method::PUT, path, body).await
    }

    /// The backend's PATCH endpoints take no body: the server computes
    /// the next state itself (order status, user status toggle).
    async fn patch(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::PATCH, path, None).await
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, path, None).await
    }
}

/// HTTP gateway backed by reqwest, with the backend session cookie held
/// in the client's cookie store.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a new HTTP gateway from configuration
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Map the HTTP response onto the error taxonomy.
    async fn handle_response(response: reqwest::Response) -> ApiResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = extract_message(&text);
            return match status {
                StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ApiError::Forbidden(message)),
                StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ApiError::Validation(message))
                }
                _ => Err(ApiError::Internal(message)),
            };
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(Into::into)
    }
}

/// Pull the backend's `{"message": ...}` out of an error body, falling
/// back to the raw text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "api request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_extraction() {
        assert_eq!(extract_message(r#"{"message":"code taken"}"#), "code taken");
        assert_eq!(extract_message("plain failure"), "plain failure");
    }

    #[test]
    fn url_join_tolerates_slashes() {
        let gateway = HttpGateway::new(&ClientConfig::new("http://localhost:5000/api/")).unwrap();
        assert_eq!(
            gateway.url("/restaurants/all-restaurants"),
            "http://localhost:5000/api/restaurants/all-restaurants"
        );
    }
}
