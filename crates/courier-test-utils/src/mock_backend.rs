// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory scripted implementation of [`ChatBackend`].
//!
//! State-machine and session tests use this instead of a wiremock server:
//! failures are queued per operation (`fail_next_send` etc.) and every call
//! is recorded for assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use courier_core::{
    ChatBackend, ChatMessage, Context, ContextId, CourierError, MessageId, SendReceipt, Sender,
    UserProfile,
};

struct MockState {
    profile: UserProfile,
    auth_rejection: Option<String>,
    session_valid: bool,
    histories: HashMap<String, Vec<ChatMessage>>,
    contexts: Vec<Context>,
    bot_reply: String,
    next_id: i64,
    fail_sends: u32,
    fail_updates: u32,
    fail_deletes: u32,
    history_failing: bool,
    logout_calls: u32,
    sent_texts: Vec<String>,
    history_requests: Vec<ContextId>,
}

/// Scripted chat backend. All methods resolve immediately; behavior is
/// driven by the builder methods and failure queues below.
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                profile: UserProfile {
                    email: "ada@example.com".to_string(),
                    name: "Ada".to_string(),
                },
                auth_rejection: None,
                session_valid: true,
                histories: HashMap::new(),
                contexts: Vec::new(),
                bot_reply: "Understood.".to_string(),
                next_id: 100,
                fail_sends: 0,
                fail_updates: 0,
                fail_deletes: 0,
                history_failing: false,
                logout_calls: 0,
                sent_texts: Vec::new(),
                history_requests: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    // --- builders ---

    /// Seeds the default context's history.
    pub fn with_history(self, messages: Vec<ChatMessage>) -> Self {
        self.lock()
            .histories
            .insert(ContextId::DEFAULT.to_string(), messages);
        self
    }

    /// Seeds a named context's history.
    pub fn with_context_history(self, context: &str, messages: Vec<ChatMessage>) -> Self {
        self.lock().histories.insert(context.to_string(), messages);
        self
    }

    /// Seeds the named context listing (the default context is not listed).
    pub fn with_contexts(self, contexts: Vec<Context>) -> Self {
        self.lock().contexts = contexts;
        self
    }

    pub fn with_bot_reply(self, reply: &str) -> Self {
        self.lock().bot_reply = reply.to_string();
        self
    }

    // --- scripting ---

    /// Queue one send failure (network-shaped).
    pub fn fail_next_send(&self) {
        self.lock().fail_sends += 1;
    }

    /// Queue one update failure (API-shaped).
    pub fn fail_next_update(&self) {
        self.lock().fail_updates += 1;
    }

    /// Queue one delete failure (API-shaped).
    pub fn fail_next_delete(&self) {
        self.lock().fail_deletes += 1;
    }

    /// Make login and signup reject with this server detail.
    pub fn reject_auth(&self, message: &str) {
        self.lock().auth_rejection = Some(message.to_string());
    }

    /// Make the next `whoami` calls fail until a successful login.
    pub fn expire_session(&self) {
        self.lock().session_valid = false;
    }

    /// Toggle history fetch failures (network-shaped).
    pub fn set_history_failing(&self, failing: bool) {
        self.lock().history_failing = failing;
    }

    // --- inspection ---

    pub fn logout_calls(&self) -> u32 {
        self.lock().logout_calls
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.lock().sent_texts.clone()
    }

    pub fn history_requests(&self) -> Vec<ContextId> {
        self.lock().history_requests.clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn login(&self, email: &str, _password: &str) -> Result<UserProfile, CourierError> {
        let mut s = self.lock();
        if let Some(message) = &s.auth_rejection {
            return Err(CourierError::Auth {
                message: message.clone(),
            });
        }
        s.session_valid = true;
        let mut profile = s.profile.clone();
        profile.email = email.to_string();
        s.profile = profile.clone();
        Ok(profile)
    }

    async fn signup(
        &self,
        email: &str,
        name: &str,
        _password: &str,
    ) -> Result<UserProfile, CourierError> {
        let mut s = self.lock();
        if let Some(message) = &s.auth_rejection {
            return Err(CourierError::Auth {
                message: message.clone(),
            });
        }
        s.session_valid = true;
        s.profile = UserProfile {
            email: email.to_string(),
            name: name.to_string(),
        };
        Ok(s.profile.clone())
    }

    async fn whoami(&self) -> Result<UserProfile, CourierError> {
        let s = self.lock();
        if !s.session_valid {
            return Err(CourierError::Auth {
                message: "session cookie missing or invalid".to_string(),
            });
        }
        Ok(s.profile.clone())
    }

    async fn logout(&self) -> Result<(), CourierError> {
        let mut s = self.lock();
        s.logout_calls += 1;
        s.session_valid = false;
        Ok(())
    }

    async fn history(&self, context: &ContextId) -> Result<Vec<ChatMessage>, CourierError> {
        let mut s = self.lock();
        s.history_requests.push(context.clone());
        if s.history_failing {
            return Err(CourierError::Network {
                message: "mock history failure".to_string(),
                source: None,
            });
        }
        Ok(s.histories.get(&context.0).cloned().unwrap_or_default())
    }

    async fn send_message(
        &self,
        text: &str,
        context: &ContextId,
    ) -> Result<SendReceipt, CourierError> {
        let mut s = self.lock();
        if s.fail_sends > 0 {
            s.fail_sends -= 1;
            return Err(CourierError::Network {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        s.sent_texts.push(text.to_string());

        let id = s.next_id;
        s.next_id += 2;
        let timestamp = 1_000 + id;
        let user_message =
            ChatMessage::acknowledged(Sender::User, text, timestamp, MessageId(id));
        let bot_message = ChatMessage::acknowledged(
            Sender::System,
            s.bot_reply.clone(),
            timestamp + 1,
            MessageId(id + 1),
        );

        let history = s.histories.entry(context.0.clone()).or_default();
        history.push(user_message.clone());
        history.push(bot_message.clone());

        Ok(SendReceipt {
            user_message,
            bot_message,
        })
    }

    async fn update_message(
        &self,
        id: MessageId,
        text: &str,
    ) -> Result<ChatMessage, CourierError> {
        let mut s = self.lock();
        if s.fail_updates > 0 {
            s.fail_updates -= 1;
            return Err(CourierError::Api {
                status: 422,
                message: "mock update failure".to_string(),
            });
        }
        let mut timestamp = 0;
        for history in s.histories.values_mut() {
            if let Some(stored) = history.iter_mut().find(|m| m.id == Some(id)) {
                stored.text = text.to_string();
                timestamp = stored.timestamp;
            }
        }
        Ok(ChatMessage::acknowledged(Sender::User, text, timestamp, id))
    }

    async fn delete_message(&self, id: MessageId) -> Result<(), CourierError> {
        let mut s = self.lock();
        if s.fail_deletes > 0 {
            s.fail_deletes -= 1;
            return Err(CourierError::Api {
                status: 500,
                message: "mock delete failure".to_string(),
            });
        }
        for history in s.histories.values_mut() {
            history.retain(|m| m.id != Some(id));
        }
        Ok(())
    }

    async fn contexts(&self) -> Result<Vec<Context>, CourierError> {
        Ok(self.lock().contexts.clone())
    }
}
