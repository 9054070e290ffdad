// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP backend for the Courier chat client.
//!
//! Implements [`courier_core::ChatBackend`] over reqwest with a cookie jar
//! for session continuity. See [`client::HttpBackend`].

pub mod client;
pub mod types;

pub use client::HttpBackend;
