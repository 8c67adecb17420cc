//! HTTP client for the remote profile API.
//!
//! The wire contract: user payloads travel as a `{profile, settings}`
//! envelope; error bodies are `{error: "..."}`. Updates are sent per
//! field group - the whole profile object and/or the whole settings
//! object - which is also the server's merge granularity.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::profile::{AppSettings, UserProfile};

/// The `{profile, settings}` payload the API speaks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub profile: UserProfile,
    pub settings: AppSettings,
}

#[derive(Debug, Serialize)]
struct CreateUserBody<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<&'a AppSettings>,
}

#[derive(Debug, Serialize)]
struct PatchUserBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<&'a AppSettings>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Server health report.
#[derive(Debug, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(rename = "usersCount")]
    pub users_count: serde_json::Value,
    pub timestamp: String,
}

/// Thin typed wrapper over the profile API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL from FOCUSFLOW_API_URL, defaulting to the local server.
    pub fn from_env() -> Self {
        let base =
            std::env::var("FOCUSFLOW_API_URL").unwrap_or_else(|_| "http://localhost:3001".into());
        Self::new(base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/users/{id}`.
    pub async fn fetch_user(&self, id: &str) -> Result<UserEnvelope, SyncError> {
        let url = format!("{}/api/users/{}", self.base_url, id);
        let resp = self.http.get(&url).send().await?;
        Self::decode(resp).await
    }

    /// `POST /api/users`. The server fills unset fields with its defaults.
    pub async fn create_user(
        &self,
        id: &str,
        profile: Option<&UserProfile>,
        settings: Option<&AppSettings>,
    ) -> Result<UserEnvelope, SyncError> {
        let url = format!("{}/api/users", self.base_url);
        let body = CreateUserBody {
            id,
            profile,
            settings,
        };
        let resp = self.http.post(&url).json(&body).send().await?;
        Self::decode(resp).await
    }

    /// `PATCH /api/users/{id}`. At least one field group is required.
    pub async fn patch_user(
        &self,
        id: &str,
        profile: Option<&UserProfile>,
        settings: Option<&AppSettings>,
    ) -> Result<UserEnvelope, SyncError> {
        let url = format!("{}/api/users/{}", self.base_url, id);
        let body = PatchUserBody { profile, settings };
        let resp = self.http.patch(&url).json(&body).send().await?;
        Self::decode(resp).await
    }

    /// `GET /api/health`.
    pub async fn health(&self) -> Result<HealthReport, SyncError> {
        let url = format!("{}/api/health", self.base_url);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Http(status.as_u16()));
        }
        Ok(resp.json().await?)
    }

    async fn decode(resp: reqwest::Response) -> Result<UserEnvelope, SyncError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        match status.as_u16() {
            404 => Err(SyncError::NotFound),
            400 => {
                let message = resp
                    .json::<ErrorBody>()
                    .await
                    .map(|b| b.error)
                    .unwrap_or_else(|_| "bad request".to_string());
                Err(SyncError::Validation(message))
            }
            code => Err(SyncError::Http(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_json() -> String {
        serde_json::to_string(&UserEnvelope::default()).unwrap()
    }

    #[tokio::test]
    async fn fetch_user_decodes_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/users/focus-abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(envelope_json())
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let envelope = client.fetch_user("focus-abc").await.unwrap();
        assert_eq!(envelope.profile.total_tasks, 0);
        assert_eq!(envelope.settings.volume, 50);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_unknown_user_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/users/focus-missing")
            .with_status(404)
            .with_body(r#"{"error":"Usuário não encontrado"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.fetch_user("focus-missing").await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound));
    }

    #[tokio::test]
    async fn create_user_posts_id_and_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/users")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "id": "focus-abc"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(envelope_json())
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let profile = UserProfile::default();
        client
            .create_user("focus-abc", Some(&profile), None)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn patch_rejection_surfaces_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/api/users/focus-abc")
            .with_status(400)
            .with_body(r#"{"error":"Dados para atualização são obrigatórios"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.patch_user("focus-abc", None, None).await.unwrap_err();
        match err {
            SyncError::Validation(message) => assert!(message.contains("obrigatórios")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_errors_map_to_http_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/users/focus-abc")
            .with_status(500)
            .with_body(r#"{"error":"Erro interno do servidor"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.fetch_user("focus-abc").await.unwrap_err();
        assert!(matches!(err, SyncError::Http(500)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 1 is never listening.
        let client = ApiClient::new("http://127.0.0.1:1");
        let err = client.fetch_user("focus-abc").await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));
    }

    #[tokio::test]
    async fn health_decodes_report() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"OK","usersCount":3,"timestamp":"2025-01-01T00:00:00Z"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let report = client.health().await.unwrap();
        assert_eq!(report.status, "OK");
        assert_eq!(report.users_count, serde_json::json!(3));
    }
}
