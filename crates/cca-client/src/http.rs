//! # HTTP Layer
//!
//! reqwest wrapper that resolves paths against the backend base URL,
//! attaches the bearer token and a request id, and turns non-success
//! responses into [`ClientError`]s carrying the backend's message.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::token::SharedTokenStore;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("cca-client/{}", crate::VERSION),
        }
    }
}

/// Whether a request carries the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Anonymous,
}

/// Backend client. Cheap to clone; clones share the connection pool and
/// the token store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    tokens: SharedTokenStore,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("logged_in", &self.tokens.token().is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty or unparseable base URL,
    /// or when the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig, tokens: SharedTokenStore) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Config("base URL is empty".to_string()));
        }
        let base = Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config(format!("{base_url} cannot be a base URL")));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url,
            base,
            tokens,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn tokens(&self) -> &SharedTokenStore {
        &self.tokens
    }

    /// Absolute URL for a backend path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Backend path made of a fixed `prefix` and caller-supplied segments.
    /// Each segment is percent-encoded, so ids cannot add or climb path
    /// levels; `.` and `..` segments are dropped.
    #[must_use]
    pub fn path(&self, prefix: &str, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear()
                .extend(prefix.split('/').filter(|s| !s.is_empty()))
                .extend(segments);
        }
        url.path().to_string()
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());

        if auth == Auth::Bearer {
            if let Some(token) = self.tokens.token() {
                match HeaderValue::from_str(&format!("Bearer {token}")) {
                    Ok(value) => builder = builder.header(AUTHORIZATION, value),
                    Err(_) => tracing::warn!("Stored token is not a valid header value, sending without it"),
                }
            }
        }

        builder
    }

    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        tracing::debug!(%method, path, request_id = %request_id, "Sending request");

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, path, request_id = %request_id, error = %e, "Request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(
            %method,
            path,
            request_id = %request_id,
            status = status.as_u16(),
            message = %message,
            "Backend returned an error"
        );

        if status == StatusCode::UNAUTHORIZED {
            Err(ClientError::Unauthorized(message))
        } else {
            Err(ClientError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `GET` a JSON resource with query parameters
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let builder = self.request(Method::GET, path, Auth::Bearer).query(query);
        let response = self.send(Method::GET, path, builder).await?;
        Self::decode(response).await
    }

    /// Send a JSON body and decode the JSON response
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), path, Auth::Bearer).json(body);
        let response = self.send(method, path, builder).await?;
        Self::decode(response).await
    }

    /// `DELETE` a resource, ignoring the response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path, Auth::Bearer);
        self.send(Method::DELETE, path, builder).await?;
        Ok(())
    }

    /// `GET` a binary resource
    pub async fn get_bytes(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
        let builder = self.request(Method::GET, path, Auth::Bearer).query(query);
        let response = self.send(Method::GET, path, builder).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a file as the multipart field `file`
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<T> {
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, path, Auth::Bearer).multipart(form);
        let response = self.send(Method::POST, path, builder).await?;
        Self::decode(response).await
    }

    /// `GET` without the bearer token (password recovery flow)
    pub async fn get_json_anonymous<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path, Auth::Anonymous);
        let response = self.send(Method::GET, path, builder).await?;
        Self::decode(response).await
    }

    /// `POST` a JSON body without the bearer token
    pub async fn post_json_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path, Auth::Anonymous).json(body);
        let response = self.send(Method::POST, path, builder).await?;
        Self::decode(response).await
    }
}

/// Message for a failed response: the body's `message` or `error` field,
/// else the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;

    #[test]
    fn test_error_message_prefers_body() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Campaña no encontrada"}"#),
            "Campaña no encontrada"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":"bad filter"}"#),
            "bad filter"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>"),
            "Error 500: Internal Server Error"
        );
    }

    #[test]
    fn test_base_url_normalized() {
        let config = ClientConfig {
            base_url: "http://api.example.es/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(config, MemoryTokenStore::shared()).unwrap();
        assert_eq!(client.url("/api/users"), "http://api.example.es/api/users");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let config = ClientConfig {
            base_url: "http://api.example.es/backend/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(config, MemoryTokenStore::shared()).unwrap();

        assert_eq!(client.path("/api/campaigns", &["c1"]), "/api/campaigns/c1");
        assert_eq!(client.path("/api/tickets", &["t 1", "status"]), "/api/tickets/t%201/status");
        assert_eq!(
            client.path("/api/auth/validate-reset-code", &["../../users"]),
            "/api/auth/validate-reset-code/..%2F..%2Fusers"
        );
        assert_eq!(client.path("/api/users", &[".."]), "/api/users");
        assert_eq!(
            client.url(&client.path("/api/users", &["u1"])),
            "http://api.example.es/backend/api/users/u1"
        );
    }

    #[test]
    fn test_unparseable_base_url_rejected() {
        let config = ClientConfig {
            base_url: "api.example.es".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ApiClient::new(config, MemoryTokenStore::shared()),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let config = ClientConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ApiClient::new(config, MemoryTokenStore::shared()),
            Err(ClientError::Config(_))
        ));
    }
}
