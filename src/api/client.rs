//! API client for communicating with the Rollbook REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! JSON requests against the school management backend. The bearer token
//! is re-resolved from the session vault before every request, so a logout
//! performed elsewhere takes effect on the next call.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthVault, SessionData};

use super::ApiError;

/// Login endpoint path. 401s from it carry a credentials message and must
/// not tear down whatever session already exists.
const LOGIN_ENDPOINT: &str = "/auth/login";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    user: Option<Value>,
    #[serde(rename = "expiresAt", default)]
    expires_at: Option<DateTime<Utc>>,
}

/// API client for the Rollbook backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    vault: Arc<AuthVault>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    /// No timeout is set at this layer; interactive callers rely on the
    /// transport default and decide themselves whether to retry.
    pub fn new(base_url: impl Into<String>, vault: Arc<AuthVault>) -> Result<Self> {
        let client = Client::builder().build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            vault,
        })
    }

    pub fn vault(&self) -> &AuthVault {
        &self.vault
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn is_login_endpoint(endpoint: &str) -> bool {
        endpoint.trim_start_matches('/') == LOGIN_ENDPOINT.trim_start_matches('/')
    }

    /// Headers for every request: JSON content type, plus a bearer token
    /// when one resolves from the vault. Caller-supplied headers are merged
    /// on top and may override both.
    fn request_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.vault.resolve_token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Map a non-2xx response to an error, tearing down the session on a
    /// 401 from any endpoint except login. No redirect happens here; the
    /// caller is left with a cleared vault and a `SessionExpired` error.
    fn handle_error_status(&self, endpoint: &str, status: StatusCode, body: &str) -> ApiError {
        if status == StatusCode::UNAUTHORIZED && !Self::is_login_endpoint(endpoint) {
            if let Err(e) = self.vault.clear() {
                warn!(error = %e, "Failed to clear session state after 401");
            }
            return ApiError::SessionExpired;
        }
        ApiError::from_status(status, body)
    }

    /// The single request path every verb delegates to.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        extra_headers: Option<header::HeaderMap>,
    ) -> Result<T> {
        let url = self.url(endpoint);
        let mut headers = self.request_headers()?;
        if let Some(extra) = extra_headers {
            for (name, value) in extra.iter() {
                headers.insert(name, value.clone());
            }
        }

        let mut request = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                // Distinct notification path: the server was never reached.
                warn!(url = %url, error = %e, "Network request failed");
                return Err(ApiError::Network(e).into());
            }
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return serde_json::from_value(Value::Object(Default::default()))
                .context("Failed to represent 204 response as empty object");
        }

        let text = response.text().await.map_err(ApiError::Network)?;
        if !status.is_success() {
            debug!(method = %method, url = %url, status = %status, "Request failed");
            return Err(self.handle_error_status(endpoint, status, &text).into());
        }

        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e)).into()
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(Method::GET, endpoint, None, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::POST, endpoint, Some(&body), None).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::PUT, endpoint, Some(&body), None).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::PATCH, endpoint, Some(&body), None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(Method::DELETE, endpoint, None, None).await
    }

    /// Escape hatch for callers that need extra or overriding headers.
    pub async fn request_with_headers<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        headers: header::HeaderMap,
    ) -> Result<T> {
        self.request(method, endpoint, body, Some(headers)).await
    }

    // ===== Authentication =====

    /// Authenticate and store the resulting session in the tier selected by
    /// `remember`. A 401 here surfaces as a validation error with the
    /// server's message, not a session teardown.
    pub async fn login(&self, username: &str, password: &str, remember: bool) -> Result<SessionData> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response: LoginResponse = self.post(LOGIN_ENDPOINT, &body).await?;

        let data = SessionData {
            token: response.token,
            user: response.user,
            expires_at: response.expires_at,
        };
        self.vault.store_session(&data, remember)?;
        Ok(data)
    }

    /// Drop all local session state, both tiers.
    pub fn logout(&self) -> Result<()> {
        self.vault.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStore, SessionStore, StoreKey, Tier};

    fn client_with_vault(vault: AuthVault) -> ApiClient {
        ApiClient::new("http://localhost:5000/api", Arc::new(vault)).unwrap()
    }

    fn seeded_vault() -> AuthVault {
        let vault = AuthVault::in_memory();
        vault
            .store_session(
                &SessionData {
                    token: "tok".into(),
                    user: Some(serde_json::json!({"id": 1})),
                    expires_at: Some(Utc::now()),
                },
                true,
            )
            .unwrap();
        vault
    }

    #[test]
    fn test_is_login_endpoint() {
        assert!(ApiClient::is_login_endpoint("/auth/login"));
        assert!(ApiClient::is_login_endpoint("auth/login"));
        assert!(!ApiClient::is_login_endpoint("/auth/refresh"));
        assert!(!ApiClient::is_login_endpoint("/attendance"));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = client_with_vault(AuthVault::in_memory());
        assert_eq!(client.url("/students"), "http://localhost:5000/api/students");
        assert_eq!(client.url("students"), "http://localhost:5000/api/students");
    }

    #[test]
    fn test_headers_include_bearer_when_token_present() {
        let client = client_with_vault(seeded_vault());
        let headers = client.request_headers().unwrap();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::AUTHORIZATION], "Bearer tok");
    }

    #[test]
    fn test_headers_omit_bearer_without_token() {
        let client = client_with_vault(AuthVault::in_memory());
        let headers = client.request_headers().unwrap();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_headers_attach_token_stranded_in_ephemeral_tier() {
        // Remember preference says durable, but the token only survives in
        // the ephemeral tier; the fallback chain must still attach it.
        let durable = MemoryStore::new();
        durable.set(StoreKey::RememberMe, "true").unwrap();
        let ephemeral = MemoryStore::new();
        ephemeral.set(StoreKey::Token, "stranded").unwrap();

        let client = client_with_vault(AuthVault::new(Box::new(durable), Box::new(ephemeral)));
        let headers = client.request_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer stranded");
    }

    #[test]
    fn test_401_from_api_endpoint_clears_both_tiers() {
        let vault = seeded_vault();
        // Seed the ephemeral tier too, so the teardown provably spans tiers
        for key in StoreKey::ALL {
            vault.store(Tier::Ephemeral).set(key, "x").unwrap();
        }
        let client = client_with_vault(vault);

        let err = client.handle_error_status("/attendance", StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::SessionExpired));

        for tier in [Tier::Durable, Tier::Ephemeral] {
            for key in StoreKey::ALL {
                assert_eq!(client.vault().store(tier).get(key), None);
            }
        }
        assert_eq!(client.vault().resolve_token(), None);
    }

    #[test]
    fn test_401_from_login_endpoint_keeps_session() {
        let client = client_with_vault(seeded_vault());

        let err = client.handle_error_status(
            LOGIN_ENDPOINT,
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid credentials"}"#,
        );
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(client.vault().resolve_token(), Some("tok".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_server_surfaces_as_network_error() {
        // Port 1 is never listening; the connect fails before any HTTP
        // response exists, which must classify as Network, not Server.
        let client =
            ApiClient::new("http://127.0.0.1:1", Arc::new(AuthVault::in_memory())).unwrap();

        let err = client.get::<Value>("/students").await.unwrap_err();
        let api_err = err.downcast_ref::<ApiError>().expect("ApiError expected");
        assert!(matches!(api_err, ApiError::Network(_)));
    }

    #[test]
    fn test_non_401_statuses_classify_without_teardown() {
        let client = client_with_vault(seeded_vault());

        let err = client.handle_error_status("/students/99", StatusCode::NOT_FOUND, "");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Error 404");

        let err = client.handle_error_status("/students", StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(matches!(err, ApiError::Server { status: 500, .. }));

        assert_eq!(client.vault().resolve_token(), Some("tok".to_string()));
    }
}
