// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire request/response types for the chat backend API.

use courier_core::{ChatMessage, Context, ContextId, MessageId, Sender, UserProfile};
use serde::{Deserialize, Serialize};

// --- Auth types ---

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
}

/// Identity payload returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
}

impl From<ProfileResponse> for UserProfile {
    fn from(p: ProfileResponse) -> Self {
        Self {
            email: p.email,
            name: p.name,
        }
    }
}

// --- Chat types ---

/// A message as the backend represents it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: i64,
    pub sender_type: Sender,
    pub message: String,
    /// Seconds since epoch.
    pub timestamp: i64,
}

impl WireMessage {
    /// Every message the backend hands back is acknowledged: `Sent`, id set.
    pub fn into_chat_message(self) -> ChatMessage {
        ChatMessage::acknowledged(
            self.sender_type,
            self.message,
            self.timestamp,
            MessageId(self.id),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendRequest<'a> {
    pub message: &'a str,
    pub context: &'a str,
}

/// The send endpoint acknowledges the user's message and pairs it with the
/// bot's reply in the same response.
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    pub user_message: WireMessage,
    pub bot_message: WireMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    pub id: i64,
    pub message: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteRequest {
    pub id: i64,
}

/// The backend serializes context ids inconsistently (numbers from the
/// database, the string sentinel "0" for the default); accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireContextId {
    Num(i64),
    Str(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireContext {
    pub id: WireContextId,
    pub title: String,
}

impl From<WireContext> for Context {
    fn from(c: WireContext) -> Self {
        let id = match c.id {
            WireContextId::Num(n) => n.to_string(),
            WireContextId::Str(s) => s,
        };
        Self {
            id: ContextId(id),
            title: c.title,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextsResponse {
    pub contexts: Vec<WireContext>,
}

// --- Error body ---

/// Error payload shape. The backend reports either `message` or `detail`
/// depending on the endpoint; callers fall back to a generic string when
/// neither is present.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Extract a human-readable error message from a response body, if any.
pub fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.detail).filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::DeliveryState;

    #[test]
    fn wire_message_becomes_sent_chat_message() {
        let wire = WireMessage {
            id: 42,
            sender_type: Sender::User,
            message: "hello".into(),
            timestamp: 1_700_000_000,
        };
        let msg = wire.into_chat_message();
        assert_eq!(msg.delivery, DeliveryState::Sent);
        assert_eq!(msg.id, Some(MessageId(42)));
        assert!(msg.identity_consistent());
    }

    #[test]
    fn sender_type_deserializes_from_screaming_case() {
        let wire: WireMessage = serde_json::from_str(
            r#"{"id": 1, "sender_type": "SYSTEM", "message": "hi", "timestamp": 0}"#,
        )
        .unwrap();
        assert_eq!(wire.sender_type, Sender::System);
    }

    #[test]
    fn context_ids_accept_numbers_and_strings() {
        let resp: ContextsResponse = serde_json::from_str(
            r#"{"contexts": [{"id": 3, "title": "Onboarding"}, {"id": "7", "title": "Billing"}]}"#,
        )
        .unwrap();
        let contexts: Vec<Context> = resp.contexts.into_iter().map(Into::into).collect();
        assert_eq!(contexts[0].id.0, "3");
        assert_eq!(contexts[1].id.0, "7");
    }

    #[test]
    fn error_message_prefers_message_over_detail() {
        let body = r#"{"message": "User already exists.", "detail": "conflict"}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("User already exists.")
        );
    }

    #[test]
    fn error_message_falls_back_to_detail() {
        let body = r#"{"detail": "Invalid credentials."}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Invalid credentials.")
        );
    }

    #[test]
    fn error_message_absent_for_unparseable_or_empty_bodies() {
        assert!(extract_error_message("<html>gateway error</html>").is_none());
        assert!(extract_error_message(r#"{"message": ""}"#).is_none());
        assert!(extract_error_message("{}").is_none());
    }
}
