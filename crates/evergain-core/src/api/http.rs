use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::WorkoutBackend;
use crate::error::{ConfigError, CoreError, Result};
use crate::models::{
    ActiveSessionResponse, AuthResponse, EndSessionRequest, Exercise, LogSetRequest, LoginRequest,
    RegisterRequest, Session, SessionType, SetCountResponse, StartSessionRequest, WorkoutSet,
};

/// reqwest-backed client for the workout API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "api.base_url".into(),
            message,
        };
        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid(format!("'{base_url}' cannot be used as a base URL")).into());
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `POST /auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let url = self.endpoint(&["auth", "login"]);
        self.post_json(url, &LoginRequest { email, password }).await
    }

    /// `POST /auth/register`
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let url = self.endpoint(&["auth", "register"]);
        self.post_json(
            url,
            &RegisterRequest {
                full_name,
                email,
                password,
            },
        )
        .await
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base can always take path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn endpoint_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint(segments);
        url.query_pairs_mut().extend_pairs(query);
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let resp = self.authorize(self.http.get(url)).send().await?;
        read_json(resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(%url, "POST");
        let resp = self.authorize(self.http.post(url)).json(body).send().await?;
        read_json(resp).await
    }
}

/// Decode a success body, or turn a non-2xx response into [`CoreError::Server`]
/// carrying the server's `error`/`message` field when there is one.
///
/// A 2xx body that does not decode is [`CoreError::Json`], not a network error.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.bytes().await?;
        return serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "undecodable response body");
            CoreError::Json(e)
        });
    }
    let body = resp.text().await.unwrap_or_default();
    let message = server_message(&body);
    tracing::warn!(status = status.as_u16(), message = ?message, "request failed");
    Err(CoreError::server(status.as_u16(), message))
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl WorkoutBackend for ApiClient {
    async fn active_session(&self, user_id: &str) -> Result<Option<Session>> {
        let url = self.endpoint_with_query(&["sessions", "active"], &[("user_id", user_id)]);
        let resp: ActiveSessionResponse = self.get_json(url).await?;
        Ok(if resp.active { resp.session } else { None })
    }

    async fn start_session(&self, user_id: &str, session_type: &str) -> Result<Session> {
        let url = self.endpoint(&["sessions", "start"]);
        self.post_json(
            url,
            &StartSessionRequest {
                user_id,
                session_type,
            },
        )
        .await
    }

    async fn end_session(&self, user_id: &str) -> Result<Session> {
        let url = self.endpoint(&["sessions", "end"]);
        self.post_json(url, &EndSessionRequest { user_id }).await
    }

    async fn session_history(&self, user_id: &str, limit: u32) -> Result<Vec<Session>> {
        let limit = limit.to_string();
        let url = self.endpoint_with_query(
            &["sessions", "history"],
            &[("user_id", user_id), ("limit", &limit)],
        );
        self.get_json(url).await
    }

    async fn completed_session_sets(&self, session_id: &str) -> Result<Vec<WorkoutSet>> {
        let url = self.endpoint(&["sessions", session_id, "workout-sets"]);
        self.get_json(url).await
    }

    async fn session_types(&self) -> Result<BTreeMap<String, Vec<SessionType>>> {
        let url = self.endpoint(&["sessions", "types", "categorized"]);
        self.get_json(url).await
    }

    async fn exercises(&self, session_type: &str) -> Result<Vec<Exercise>> {
        let url = self.endpoint_with_query(
            &["sessions", "exercises"],
            &[("session_type", session_type)],
        );
        self.get_json(url).await
    }

    async fn last_set(&self, session_id: &str, exercise_name: &str) -> Result<Option<WorkoutSet>> {
        let url = self.endpoint_with_query(
            &["workout-sets", "last-set"],
            &[("session_id", session_id), ("exercise_name", exercise_name)],
        );
        // Either a set, or `{"last_set": null}` when there is none.
        let value: serde_json::Value = self.get_json(url).await?;
        match value.get("weight") {
            Some(w) if !w.is_null() => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(None),
        }
    }

    async fn set_count(&self, session_id: &str, exercise_name: &str) -> Result<u32> {
        let url = self.endpoint_with_query(
            &["workout-sets", "count"],
            &[("session_id", session_id), ("exercise_name", exercise_name)],
        );
        let resp: SetCountResponse = self.get_json(url).await?;
        Ok(resp.count)
    }

    async fn log_set(&self, request: &LogSetRequest) -> Result<WorkoutSet> {
        let url = self.endpoint(&["workout-sets", "log"]);
        self.post_json(url, request).await
    }

    async fn session_sets(&self, session_id: &str) -> Result<Vec<WorkoutSet>> {
        let url = self.endpoint(&["workout-sets", "session", session_id]);
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let c = client("http://localhost:8080/api");
        assert_eq!(
            c.endpoint(&["sessions", "start"]).as_str(),
            "http://localhost:8080/api/sessions/start"
        );
        let trailing = client("http://localhost:8080/api/");
        assert_eq!(
            trailing.endpoint(&["sessions", "end"]).as_str(),
            "http://localhost:8080/api/sessions/end"
        );
    }

    #[test]
    fn query_values_are_encoded() {
        let c = client("http://localhost:8080/api");
        let url = c.endpoint_with_query(
            &["workout-sets", "count"],
            &[("session_id", "S1"), ("exercise_name", "Bench Press & Dips")],
        );
        assert_eq!(
            url.query(),
            Some("session_id=S1&exercise_name=Bench+Press+%26+Dips")
        );
    }

    #[test]
    fn path_ids_are_escaped() {
        let c = client("http://localhost:8080/api");
        let url = c.endpoint(&["workout-sets", "session", "a/b"]);
        assert_eq!(url.path(), "/api/workout-sets/session/a%2Fb");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(ApiClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn server_message_prefers_error_then_message() {
        assert_eq!(
            server_message(r#"{"error":"session_type is required"}"#).as_deref(),
            Some("session_type is required")
        );
        assert_eq!(
            server_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(server_message("<html>502</html>"), None);
        assert_eq!(server_message(r#"{"error": 42}"#), None);
    }
}
