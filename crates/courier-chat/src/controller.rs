// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation controller: drives the per-message delivery state
//! machine against the backend.
//!
//! User messages move `Pending -> Sending -> {Sent | Failed}`. `Failed`
//! re-enters `Pending` only through an explicit resend. Delete moves
//! `Sent -> Deleting -> (removed)`, reverting to `Sent` on failure. Edit is
//! permitted only from `Sent`.
//!
//! Each message's state machine is independent and keyed by its local key;
//! there is no cross-message coordination, no locking, and no cancellation.
//! Send, edit, and delete failures become per-message state transitions,
//! never global errors -- the worst case is a message parked in `Failed`
//! awaiting a manual resend.

use std::sync::Arc;

use courier_core::{
    ChatBackend, ChatMessage, Context, ContextId, CourierError, DeliveryState, LocalKey,
};
use tracing::{debug, warn};

use crate::conversation::Conversation;

/// How a delivery attempt settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Canonical copy in place, bot reply appended.
    Delivered,
    /// Parked in `Failed`; a manual resend is the only recovery path.
    Failed,
    /// Nothing happened -- the message was not in a resendable state.
    Skipped,
}

/// How an edit attempt settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Text replaced in place, identity preserved.
    Applied,
    /// Backend rejected the edit; original text kept, state back to `Sent`.
    Reverted,
    /// Nothing happened -- the message is not editable.
    Skipped,
}

/// How a delete attempt settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Exactly one entry removed; relative order of the rest unchanged.
    Removed,
    /// Backend rejected the delete; the entry is back to `Sent`.
    Reverted,
    /// Nothing happened -- the message is not deletable.
    Skipped,
}

/// Owns the conversation for the active context and mediates all message
/// operations against the backend.
pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    conversation: Conversation,
    contexts: Vec<Context>,
    active_context: ContextId,
}

impl ChatController {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            conversation: Conversation::new(),
            contexts: vec![Context::default_context()],
            active_context: ContextId::default(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    /// Available contexts, the sentinel default first.
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn active_context(&self) -> &ContextId {
        &self.active_context
    }

    /// One-shot mount fetch: history for the active context plus the named
    /// context listing. Errors propagate unswallowed -- "fetch failed" stays
    /// distinguishable from "no messages yet"; presentation is the caller's
    /// decision.
    pub async fn load(&mut self) -> Result<(), CourierError> {
        let history = self.backend.history(&self.active_context).await?;
        let named = self.backend.contexts().await?;

        debug!(
            context = %self.active_context,
            messages = history.len(),
            contexts = named.len(),
            "conversation loaded"
        );

        self.conversation = Conversation::from_history(history);
        let mut contexts = vec![Context::default_context()];
        contexts.extend(named);
        self.contexts = contexts;
        Ok(())
    }

    /// Switches the active context and refetches its history. On failure the
    /// switch sticks but the conversation is left empty until a reload.
    pub async fn select_context(&mut self, id: ContextId) -> Result<(), CourierError> {
        self.active_context = id;
        self.conversation = Conversation::new();
        let history = self.backend.history(&self.active_context).await?;
        self.conversation = Conversation::from_history(history);
        Ok(())
    }

    /// Optimistic echo plus delivery: appends a `Pending` user message
    /// immediately, then drives it through the send cycle. Returns the
    /// message's key and how the delivery settled.
    pub async fn send(&mut self, text: &str) -> Result<(LocalKey, SendOutcome), CourierError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CourierError::Validation("message text is required".into()));
        }

        let message = ChatMessage::pending(text);
        let key = message.key.clone();
        self.conversation.push(message);

        let outcome = self.deliver(&key).await;
        Ok((key, outcome))
    }

    /// Manual recovery for a failed send: re-enters `Pending` and repeats
    /// the delivery cycle. A no-op unless the state is exactly `Failed`.
    pub async fn resend(&mut self, key: &LocalKey) -> Result<SendOutcome, CourierError> {
        let Some(message) = self.conversation.get_mut(key) else {
            return Err(unknown_message(key));
        };
        if message.delivery != DeliveryState::Failed {
            debug!(state = %message.delivery, "resend ignored");
            return Ok(SendOutcome::Skipped);
        }
        message.delivery = DeliveryState::Pending;
        Ok(self.deliver(key).await)
    }

    /// Drives one `Pending` message through `Sending` to `Sent` or `Failed`.
    ///
    /// On success the local echo is replaced in place by the server's
    /// canonical copy (id, timestamp, text) and the paired bot reply is
    /// appended as a new `Sent` system message.
    async fn deliver(&mut self, key: &LocalKey) -> SendOutcome {
        let text = {
            let Some(message) = self.conversation.get_mut(key) else {
                return SendOutcome::Skipped;
            };
            message.delivery = DeliveryState::Sending;
            message.text.clone()
        };

        let result = self.backend.send_message(&text, &self.active_context).await;

        let outcome = match result {
            Ok(receipt) => {
                if let Some(message) = self.conversation.get_mut(key) {
                    message.text = receipt.user_message.text;
                    message.timestamp = receipt.user_message.timestamp;
                    message.id = receipt.user_message.id;
                    message.delivery = DeliveryState::Sent;
                }
                self.conversation.push(receipt.bot_message);
                SendOutcome::Delivered
            }
            Err(e) => {
                warn!(error = %e, "message delivery failed");
                if let Some(message) = self.conversation.get_mut(key) {
                    message.delivery = DeliveryState::Failed;
                }
                SendOutcome::Failed
            }
        };

        self.debug_check_invariants();
        outcome
    }

    /// Replaces the text of a delivered message, identity preserved. Only a
    /// `Sent` user message with a server id is editable; anything else is a
    /// no-op. A rejected edit reverts to `Sent` with the original text --
    /// the outcome tells the caller, nothing is escalated.
    pub async fn edit(
        &mut self,
        key: &LocalKey,
        new_text: &str,
    ) -> Result<EditOutcome, CourierError> {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(CourierError::Validation("message text is required".into()));
        }

        let id = {
            let Some(message) = self.conversation.get_mut(key) else {
                return Err(unknown_message(key));
            };
            let Some(id) = message.id.filter(|_| message.is_actionable()) else {
                debug!(state = %message.delivery, "edit ignored");
                return Ok(EditOutcome::Skipped);
            };
            message.delivery = DeliveryState::Sending;
            id
        };

        let result = self.backend.update_message(id, new_text).await;

        let outcome = match result {
            Ok(updated) => {
                if let Some(message) = self.conversation.get_mut(key) {
                    message.text = updated.text;
                    message.delivery = DeliveryState::Sent;
                }
                EditOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, id = %id, "edit failed, keeping original text");
                if let Some(message) = self.conversation.get_mut(key) {
                    message.delivery = DeliveryState::Sent;
                }
                EditOutcome::Reverted
            }
        };

        self.debug_check_invariants();
        Ok(outcome)
    }

    /// Removes a delivered message. Only a `Sent` user message with a server
    /// id is deletable. The entry shows `Deleting` while the call is in
    /// flight; a rejected delete reverts it to `Sent`.
    pub async fn delete(&mut self, key: &LocalKey) -> Result<DeleteOutcome, CourierError> {
        let id = {
            let Some(message) = self.conversation.get_mut(key) else {
                return Err(unknown_message(key));
            };
            let Some(id) = message.id.filter(|_| message.is_actionable()) else {
                debug!(state = %message.delivery, "delete ignored");
                return Ok(DeleteOutcome::Skipped);
            };
            message.delivery = DeliveryState::Deleting;
            id
        };

        let result = self.backend.delete_message(id).await;

        let outcome = match result {
            Ok(()) => {
                self.conversation.remove_by_id(id);
                DeleteOutcome::Removed
            }
            Err(e) => {
                warn!(error = %e, id = %id, "delete failed, reverting");
                if let Some(message) = self.conversation.get_mut(key) {
                    message.delivery = DeliveryState::Sent;
                }
                DeleteOutcome::Reverted
            }
        };

        self.debug_check_invariants();
        Ok(outcome)
    }

    /// The id/state invariant must hold after every settled transition.
    fn debug_check_invariants(&self) {
        debug_assert!(
            self.conversation
                .messages()
                .iter()
                .all(ChatMessage::identity_consistent),
            "id/state invariant violated: {:?}",
            self.conversation.messages()
        );
    }
}

fn unknown_message(key: &LocalKey) -> CourierError {
    CourierError::Internal(format!("no message with key {}", key.0))
}
