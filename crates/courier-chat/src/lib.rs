// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation management for the Courier chat client.
//!
//! [`ChatController`] owns the ordered message list for the active context
//! and drives the per-message delivery state machine; [`Conversation`] is
//! the underlying sequence.

pub mod controller;
pub mod conversation;

pub use controller::{ChatController, DeleteOutcome, EditOutcome, SendOutcome};
pub use conversation::Conversation;
