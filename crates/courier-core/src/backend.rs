// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The backend trait seaming the remote chat API.
//!
//! `courier-api` provides the reqwest implementation; tests substitute an
//! in-memory mock. Session continuity (the cookie) lives inside the
//! implementation -- callers never see tokens or credentials.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::types::{ChatMessage, Context, ContextId, MessageId, UserProfile};

/// What the send endpoint returns: the canonical copy of the user's message
/// (server id and timestamp assigned) paired with the bot's reply.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub user_message: ChatMessage,
    pub bot_message: ChatMessage,
}

/// Client-side view of the remote chat service.
///
/// All operations are single round-trips. None retries internally; recovery
/// policy belongs to the callers (manual resend for message delivery,
/// nothing for the rest).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Exchanges credentials for a session cookie and the user's profile.
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, CourierError>;

    /// Creates an account; same session contract as [`login`](Self::login).
    async fn signup(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<UserProfile, CourierError>;

    /// Revalidates the current session.
    async fn whoami(&self) -> Result<UserProfile, CourierError>;

    /// Invalidates the session server-side.
    async fn logout(&self) -> Result<(), CourierError>;

    /// Fetches the full message history for one context. Every returned
    /// message is `Sent` with a server id.
    async fn history(&self, context: &ContextId) -> Result<Vec<ChatMessage>, CourierError>;

    /// Delivers one user message to a context.
    async fn send_message(
        &self,
        text: &str,
        context: &ContextId,
    ) -> Result<SendReceipt, CourierError>;

    /// Replaces the text of an acknowledged message, identity preserved.
    async fn update_message(
        &self,
        id: MessageId,
        text: &str,
    ) -> Result<ChatMessage, CourierError>;

    /// Removes an acknowledged message.
    async fn delete_message(&self, id: MessageId) -> Result<(), CourierError>;

    /// Lists the named contexts available to this account. The sentinel
    /// default context is not included; callers prepend it.
    async fn contexts(&self) -> Result<Vec<Context>, CourierError>;
}
