// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier chat client.
//!
//! Provides the error taxonomy, the shared domain types (messages, contexts,
//! delivery states, user identity), and the [`ChatBackend`] trait that the
//! HTTP layer implements and tests mock.

pub mod backend;
pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use backend::{ChatBackend, SendReceipt};
pub use error::CourierError;
pub use types::{
    ChatMessage, Context, ContextId, DeliveryState, LocalKey, MessageId, Sender, UserProfile,
};
