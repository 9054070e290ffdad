// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered in-memory message sequence for one conversation context.
//!
//! Strictly append/filter on an ordered list: messages render in the order
//! they were locally created or received, and the only removals are explicit
//! deletes by server id. No reordering, no merging.

use courier_core::{ChatMessage, LocalKey, MessageId};

/// Ordered sequence of messages. Created empty, filled by one history
/// fetch, then mutated by user actions and server responses. Discarded with
/// the process; nothing persists client-side.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the conversation with a freshly fetched history.
    pub fn from_history(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message at the end, preserving creation order.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn get(&self, key: &LocalKey) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.key == key)
    }

    pub(crate) fn get_mut(&mut self, key: &LocalKey) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().find(|m| &m.key == key)
    }

    /// The key of the `n`th message, 1-based, as renderers number them.
    pub fn key_at(&self, ordinal: usize) -> Option<LocalKey> {
        ordinal
            .checked_sub(1)
            .and_then(|i| self.messages.get(i))
            .map(|m| m.key.clone())
    }

    /// Removes the single entry with this server id, preserving the relative
    /// order of everything else.
    pub fn remove_by_id(&mut self, id: MessageId) -> Option<ChatMessage> {
        let index = self.messages.iter().position(|m| m.id == Some(id))?;
        Some(self.messages.remove(index))
    }
}
