// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiremock harness for end-to-end testing against the real HTTP stack.
//!
//! `ChatServerHarness` starts a `MockServer` with the backend's routes
//! mounted and hands out `HttpBackend` clients pointed at it. The send and
//! update routes answer dynamically (echoing the request, assigning ids)
//! so tests exercise the same canonical-copy flow the production backend
//! drives.

use std::sync::atomic::{AtomicI64, Ordering};

use courier_api::HttpBackend;
use courier_config::ApiConfig;
use courier_core::CourierError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Builder for the wiremock chat server.
pub struct ChatServerBuilder {
    email: String,
    name: String,
    history: Vec<serde_json::Value>,
    contexts: Vec<serde_json::Value>,
    bot_reply: String,
    failing_sends: u64,
    expired_session: bool,
}

impl ChatServerBuilder {
    fn new() -> Self {
        Self {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            history: Vec::new(),
            contexts: Vec::new(),
            bot_reply: "Understood.".to_string(),
            failing_sends: 0,
            expired_session: false,
        }
    }

    /// Seed the history endpoint with wire-shaped messages.
    pub fn with_history(mut self, messages: Vec<serde_json::Value>) -> Self {
        self.history = messages;
        self
    }

    /// Seed the named context listing.
    pub fn with_contexts(mut self, contexts: Vec<serde_json::Value>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn with_bot_reply(mut self, reply: &str) -> Self {
        self.bot_reply = reply.to_string();
        self
    }

    /// The first `n` send calls answer 503 before the send route recovers.
    pub fn with_failing_sends(mut self, n: u64) -> Self {
        self.failing_sends = n;
        self
    }

    /// Every chat route answers 401; whoami answers 401 too.
    pub fn with_expired_session(mut self) -> Self {
        self.expired_session = true;
        self
    }

    /// Start the server and mount the routes.
    pub async fn start(self) -> ChatServerHarness {
        let server = MockServer::start().await;

        let profile = serde_json::json!({"email": self.email, "name": self.name});

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(&profile)
                    .insert_header("set-cookie", "session=harness; Path=/; HttpOnly"),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(&profile)
                    .insert_header("set-cookie", "session=harness; Path=/; HttpOnly"),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        if self.expired_session {
            // The implicit-logout interceptor and the accessor's whoami
            // fallback both still hit /auth/logout; it was mounted above.
            Mock::given(method("GET"))
                .and(path("/auth/whoami"))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;
            for (verb, route) in [
                ("GET", "/chat/history"),
                ("POST", "/chat/send"),
                ("PUT", "/chat/update"),
                ("DELETE", "/chat/delete"),
                ("GET", "/chat/context"),
            ] {
                Mock::given(method(verb))
                    .and(path(route))
                    .respond_with(ResponseTemplate::new(401))
                    .mount(&server)
                    .await;
            }
            return ChatServerHarness { server };
        }

        Mock::given(method("GET"))
            .and(path("/auth/whoami"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&profile))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/chat/history"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"messages": self.history})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/chat/context"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"contexts": self.contexts})),
            )
            .mount(&server)
            .await;

        if self.failing_sends > 0 {
            Mock::given(method("POST"))
                .and(path("/chat/send"))
                .respond_with(ResponseTemplate::new(503))
                .up_to_n_times(self.failing_sends)
                .with_priority(1)
                .mount(&server)
                .await;
        }

        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .respond_with(SendResponder {
                next_id: AtomicI64::new(500),
                bot_reply: self.bot_reply.clone(),
            })
            .with_priority(5)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/chat/update"))
            .respond_with(UpdateResponder)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/chat/delete"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        ChatServerHarness { server }
    }
}

/// A running wiremock chat server.
pub struct ChatServerHarness {
    /// Exposed for mounting scenario-specific overrides.
    pub server: MockServer,
}

impl ChatServerHarness {
    /// Create a new builder with default seed data.
    pub fn builder() -> ChatServerBuilder {
        ChatServerBuilder::new()
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// An `ApiConfig` pointed at this server with a short test timeout.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.uri(),
            timeout_secs: 5,
        }
    }

    /// A fresh HTTP backend with its own cookie jar, pointed at this server.
    pub fn backend(&self) -> Result<HttpBackend, CourierError> {
        HttpBackend::new(&self.api_config())
    }
}

/// Answers `/chat/send` with the canonical pair: the user's text echoed
/// back under a fresh id, plus the configured bot reply.
struct SendResponder {
    next_id: AtomicI64,
    bot_reply: String,
}

impl Respond for SendResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value =
            serde_json::from_slice(&request.body).unwrap_or_default();
        let text = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default();
        let id = self.next_id.fetch_add(2, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user_message": {
                "id": id,
                "sender_type": "USER",
                "message": text,
                "timestamp": 5_000 + id,
            },
            "bot_message": {
                "id": id + 1,
                "sender_type": "SYSTEM",
                "message": self.bot_reply,
                "timestamp": 5_001 + id,
            },
        }))
    }
}

/// Answers `/chat/update` by echoing the edited text under the given id.
struct UpdateResponder;

impl Respond for UpdateResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value =
            serde_json::from_slice(&request.body).unwrap_or_default();
        let id = body.get("id").and_then(|v| v.as_i64()).unwrap_or_default();
        let text = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": id,
            "sender_type": "USER",
            "message": text,
            "timestamp": 6_000 + id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{ChatBackend, ContextId};

    #[tokio::test]
    async fn harness_serves_the_full_route_set() {
        let harness = ChatServerHarness::builder()
            .with_history(vec![serde_json::json!(
                {"id": 1, "sender_type": "SYSTEM", "message": "welcome", "timestamp": 100}
            )])
            .start()
            .await;

        let backend = harness.backend().unwrap();
        backend.login("ada@example.com", "pw").await.unwrap();
        assert_eq!(backend.whoami().await.unwrap().name, "Ada");

        let history = backend.history(&ContextId::default()).await.unwrap();
        assert_eq!(history.len(), 1);

        let receipt = backend
            .send_message("hello", &ContextId::default())
            .await
            .unwrap();
        assert_eq!(receipt.user_message.text, "hello");
        assert_eq!(receipt.bot_message.text, "Understood.");
    }

    #[tokio::test]
    async fn failing_sends_recover_after_n_calls() {
        let harness = ChatServerHarness::builder().with_failing_sends(1).start().await;
        let backend = harness.backend().unwrap();

        assert!(backend
            .send_message("first", &ContextId::default())
            .await
            .is_err());
        assert!(backend
            .send_message("second", &ContextId::default())
            .await
            .is_ok());
    }
}
