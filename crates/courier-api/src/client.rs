// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat backend API.
//!
//! Provides [`HttpBackend`], the reqwest implementation of [`ChatBackend`].
//! Session continuity is cookie-based: the client keeps a cookie jar and
//! never sees tokens. A 401 outside the auth endpoints fires one implicit
//! logout call, then surfaces `SessionExpired`.

use std::time::Duration;

use async_trait::async_trait;
use courier_config::ApiConfig;
use courier_core::{
    ChatBackend, ChatMessage, Context, ContextId, CourierError, MessageId, SendReceipt,
    UserProfile,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{
    extract_error_message, ContextsResponse, DeleteRequest, HistoryResponse, LoginRequest,
    ProfileResponse, SendRequest, SendResponse, SignupRequest, UpdateRequest, WireMessage,
};

/// Shown when an auth endpoint rejects the request without a usable body.
const GENERIC_AUTH_ERROR: &str = "An error occurred. Please try again.";

/// Which error-mapping rules apply to a request.
///
/// Auth endpoints map failures to [`CourierError::Auth`] and are exempt from
/// 401 interception (a rejected login is not an expired session). Everything
/// else maps to [`CourierError::Api`], with 401 escalated to `SessionExpired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Auth,
    Chat,
}

/// HTTP implementation of the chat backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a backend client from configuration.
    ///
    /// The cookie jar lives as long as the client; dropping it is the only
    /// client-side session teardown there is.
    pub fn new(config: &ApiConfig) -> Result<Self, CourierError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CourierError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and maps non-success statuses per the scope rules.
    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        scope: Scope,
    ) -> Result<reqwest::Response, CourierError> {
        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out"
            } else {
                "request failed"
            };
            CourierError::network(message, e)
        })?;

        let status = response.status();
        debug!(status = %status, "response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_error_message(&body);

        match scope {
            Scope::Auth => Err(CourierError::Auth {
                message: detail.unwrap_or_else(|| GENERIC_AUTH_ERROR.to_string()),
            }),
            Scope::Chat if status == reqwest::StatusCode::UNAUTHORIZED => {
                self.implicit_logout().await;
                Err(CourierError::SessionExpired)
            }
            Scope::Chat => Err(CourierError::Api {
                status: status.as_u16(),
                message: detail
                    .unwrap_or_else(|| format!("request failed with status {status}")),
            }),
        }
    }

    /// One best-effort logout fired when a chat endpoint answers 401.
    /// Failure here must not mask the original error.
    async fn implicit_logout(&self) {
        match self.client.post(self.url("/auth/logout")).send().await {
            Ok(resp) => debug!(status = %resp.status(), "implicit logout after 401"),
            Err(e) => warn!(error = %e, "implicit logout after 401 failed"),
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CourierError> {
        let body = response
            .text()
            .await
            .map_err(|e| CourierError::network("failed to read response body", e))?;
        serde_json::from_str(&body)
            .map_err(|e| CourierError::Internal(format!("failed to parse backend response: {e}")))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, CourierError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password });
        let response = self.dispatch(request, Scope::Auth).await?;
        let profile: ProfileResponse = Self::parse_json(response).await?;
        debug!(email = %profile.email, "login accepted");
        Ok(profile.into())
    }

    async fn signup(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<UserProfile, CourierError> {
        let request = self
            .client
            .post(self.url("/auth/signup"))
            .json(&SignupRequest {
                email,
                name,
                password,
            });
        let response = self.dispatch(request, Scope::Auth).await?;
        let profile: ProfileResponse = Self::parse_json(response).await?;
        debug!(email = %profile.email, "signup accepted");
        Ok(profile.into())
    }

    async fn whoami(&self) -> Result<UserProfile, CourierError> {
        let request = self.client.get(self.url("/auth/whoami"));
        let response = self.dispatch(request, Scope::Auth).await?;
        let profile: ProfileResponse = Self::parse_json(response).await?;
        Ok(profile.into())
    }

    async fn logout(&self) -> Result<(), CourierError> {
        let request = self.client.post(self.url("/auth/logout"));
        self.dispatch(request, Scope::Auth).await?;
        Ok(())
    }

    async fn history(&self, context: &ContextId) -> Result<Vec<ChatMessage>, CourierError> {
        let request = self
            .client
            .get(self.url("/chat/history"))
            .query(&[("context", context.0.as_str())]);
        let response = self.dispatch(request, Scope::Chat).await?;
        let history: HistoryResponse = Self::parse_json(response).await?;
        debug!(context = %context, count = history.messages.len(), "history fetched");
        Ok(history
            .messages
            .into_iter()
            .map(WireMessage::into_chat_message)
            .collect())
    }

    async fn send_message(
        &self,
        text: &str,
        context: &ContextId,
    ) -> Result<SendReceipt, CourierError> {
        let request = self.client.post(self.url("/chat/send")).json(&SendRequest {
            message: text,
            context: &context.0,
        });
        let response = self.dispatch(request, Scope::Chat).await?;
        let sent: SendResponse = Self::parse_json(response).await?;
        Ok(SendReceipt {
            user_message: sent.user_message.into_chat_message(),
            bot_message: sent.bot_message.into_chat_message(),
        })
    }

    async fn update_message(
        &self,
        id: MessageId,
        text: &str,
    ) -> Result<ChatMessage, CourierError> {
        let request = self
            .client
            .put(self.url("/chat/update"))
            .json(&UpdateRequest {
                id: id.0,
                message: text,
            });
        let response = self.dispatch(request, Scope::Chat).await?;
        let updated: WireMessage = Self::parse_json(response).await?;
        Ok(updated.into_chat_message())
    }

    async fn delete_message(&self, id: MessageId) -> Result<(), CourierError> {
        let request = self
            .client
            .delete(self.url("/chat/delete"))
            .json(&DeleteRequest { id: id.0 });
        self.dispatch(request, Scope::Chat).await?;
        Ok(())
    }

    async fn contexts(&self) -> Result<Vec<Context>, CourierError> {
        let request = self.client.get(self.url("/chat/context"));
        let response = self.dispatch(request, Scope::Chat).await?;
        let listing: ContextsResponse = Self::parse_json(response).await?;
        Ok(listing.contexts.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{DeliveryState, Sender};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn profile_body() -> serde_json::Value {
        serde_json::json!({"email": "ada@example.com", "name": "Ada"})
    }

    #[tokio::test]
    async fn login_returns_profile() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(
                serde_json::json!({"email": "ada@example.com", "password": "pw"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let profile = backend.login("ada@example.com", "pw").await.unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.name, "Ada");
    }

    #[tokio::test]
    async fn login_failure_surfaces_server_detail() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Invalid credentials."})),
            )
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let err = backend.login("ada@example.com", "wrong").await.unwrap_err();
        match err {
            CourierError::Auth { message } => assert_eq!(message, "Invalid credentials."),
            other => panic!("expected Auth error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn auth_failure_without_body_uses_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let err = backend.signup("a@b.c", "A", "pw").await.unwrap_err();
        match err {
            CourierError::Auth { message } => assert_eq!(message, GENERIC_AUTH_ERROR),
            other => panic!("expected Auth error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn signup_conflict_surfaces_detail() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({"message": "User already exists."})),
            )
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let err = backend
            .signup("taken@example.com", "Ada", "pw")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("User already exists."), "got: {err}");
    }

    #[tokio::test]
    async fn session_cookie_is_replayed_on_later_requests() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(profile_body())
                    .insert_header("set-cookie", "session=abc123; Path=/; HttpOnly"),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/auth/whoami"))
            .and(header("cookie", "session=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        backend.login("ada@example.com", "pw").await.unwrap();
        let profile = backend.whoami().await;
        assert!(profile.is_ok(), "cookie should carry the session: {profile:?}");
    }

    #[tokio::test]
    async fn history_maps_wire_messages_to_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chat/history"))
            .and(query_param("context", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [
                    {"id": 1, "sender_type": "USER", "message": "hi", "timestamp": 1000},
                    {"id": 2, "sender_type": "SYSTEM", "message": "hello!", "timestamp": 1001}
                ]
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let messages = backend.history(&ContextId::default()).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].id, Some(MessageId(1)));
        assert_eq!(messages[1].sender, Sender::System);
        assert!(messages.iter().all(|m| m.delivery == DeliveryState::Sent));
    }

    #[tokio::test]
    async fn send_returns_canonical_pair() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .and(body_json(
                serde_json::json!({"message": "hello", "context": "0"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user_message": {"id": 10, "sender_type": "USER", "message": "hello", "timestamp": 2000},
                "bot_message": {"id": 11, "sender_type": "SYSTEM", "message": "hi there", "timestamp": 2001}
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let receipt = backend
            .send_message("hello", &ContextId::default())
            .await
            .unwrap();
        assert_eq!(receipt.user_message.id, Some(MessageId(10)));
        assert_eq!(receipt.user_message.text, "hello");
        assert_eq!(receipt.bot_message.sender, Sender::System);
        assert_eq!(receipt.bot_message.delivery, DeliveryState::Sent);
    }

    #[tokio::test]
    async fn update_replaces_text() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/chat/update"))
            .and(body_json(serde_json::json!({"id": 10, "message": "hello, edited"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
                {"id": 10, "sender_type": "USER", "message": "hello, edited", "timestamp": 2000}
            )))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let updated = backend
            .update_message(MessageId(10), "hello, edited")
            .await
            .unwrap();
        assert_eq!(updated.text, "hello, edited");
        assert_eq!(updated.id, Some(MessageId(10)));
    }

    #[tokio::test]
    async fn delete_failure_carries_server_message() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/chat/delete"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "message not found"})),
            )
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let err = backend.delete_message(MessageId(99)).await.unwrap_err();
        match err {
            CourierError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "message not found");
            }
            other => panic!("expected Api error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn chat_401_fires_implicit_logout_then_session_expired() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chat/history"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        // The interceptor must call logout exactly once before re-raising.
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let err = backend.history(&ContextId::default()).await.unwrap_err();
        assert!(matches!(err, CourierError::SessionExpired), "got: {err}");
        server.verify().await;
    }

    #[tokio::test]
    async fn auth_401_does_not_fire_implicit_logout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/whoami"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        // No logout mock mounted: an implicit logout would 404 but, more to
        // the point, must not be attempted at all.
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let err = backend.whoami().await.unwrap_err();
        assert!(matches!(err, CourierError::Auth { .. }), "got: {err}");
        server.verify().await;
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Nothing listens on this port.
        let backend = test_backend("http://127.0.0.1:9");
        let err = backend.history(&ContextId::default()).await.unwrap_err();
        assert!(matches!(err, CourierError::Network { .. }), "got: {err}");
        assert!(err.is_retryable());
    }
}
