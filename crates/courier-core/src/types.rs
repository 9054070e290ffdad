// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Courier workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Server-assigned message identifier. Absent on a message until the
/// backend acknowledges receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a named conversation partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub String);

impl ContextId {
    /// The sentinel id of the default context every account starts in.
    pub const DEFAULT: &'static str = "0";

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-minted key addressing a message before (and after) the server
/// assigns an id. Never crosses the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalKey(pub String);

impl LocalKey {
    /// Mints a fresh key.
    pub fn mint() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Who produced a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Sender {
    #[serde(rename = "USER")]
    #[strum(serialize = "USER")]
    User,
    #[serde(rename = "SYSTEM")]
    #[strum(serialize = "SYSTEM")]
    System,
}

/// Delivery state of a message in the conversation.
///
/// User messages move `Pending -> Sending -> {Sent | Failed}`. `Failed`
/// re-enters `Pending` only through an explicit resend. `Sent` messages
/// move through `Deleting` on the way out. System messages are always
/// `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum DeliveryState {
    /// Created locally, not yet handed to the network.
    #[strum(serialize = "pending")]
    Pending,
    /// Send or edit call in flight.
    #[strum(serialize = "sending")]
    Sending,
    /// Acknowledged by the backend.
    #[strum(serialize = "sent")]
    Sent,
    /// Send failed; waiting for a manual resend.
    #[strum(serialize = "failed")]
    Failed,
    /// Delete call in flight.
    #[strum(serialize = "deleting")]
    Deleting,
}

impl DeliveryState {
    /// True while a network call for this message is outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Sending | Self::Deleting)
    }
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Local addressing key, stable across the message's whole lifecycle.
    pub key: LocalKey,
    pub sender: Sender,
    pub text: String,
    /// Creation time, seconds since epoch.
    pub timestamp: i64,
    /// Server id; `None` until the backend acknowledges the message.
    pub id: Option<MessageId>,
    pub delivery: DeliveryState,
}

impl ChatMessage {
    /// A freshly composed user message: optimistic local echo, no id yet.
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            key: LocalKey::mint(),
            sender: Sender::User,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp(),
            id: None,
            delivery: DeliveryState::Pending,
        }
    }

    /// A server-acknowledged message (history rows, canonical send copies,
    /// bot replies).
    pub fn acknowledged(
        sender: Sender,
        text: impl Into<String>,
        timestamp: i64,
        id: MessageId,
    ) -> Self {
        Self {
            key: LocalKey::mint(),
            sender,
            text: text.into(),
            timestamp,
            id: Some(id),
            delivery: DeliveryState::Sent,
        }
    }

    /// Edit and delete are permitted only on a user message the server has
    /// acknowledged -- state `Sent` with a known id.
    pub fn is_actionable(&self) -> bool {
        self.sender == Sender::User
            && self.delivery == DeliveryState::Sent
            && self.id.is_some()
    }

    /// Checks the id/state invariant: an id is present iff the message has
    /// completed a server round-trip. `Sending` is consistent either way --
    /// a first delivery has no id yet, an in-flight edit keeps its id.
    pub fn identity_consistent(&self) -> bool {
        match self.delivery {
            DeliveryState::Sent | DeliveryState::Deleting => self.id.is_some(),
            DeliveryState::Pending | DeliveryState::Failed => self.id.is_none(),
            DeliveryState::Sending => true,
        }
    }
}

/// A named conversation partition the user can switch between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextId,
    pub title: String,
}

impl Context {
    /// The sentinel context every account starts in.
    pub fn default_context() -> Self {
        Self {
            id: ContextId::default(),
            title: "Default".to_string(),
        }
    }
}

/// Identity returned by the auth endpoints. Held in process-local state
/// for the page lifetime only -- never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}
