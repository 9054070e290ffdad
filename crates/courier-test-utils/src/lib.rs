// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Courier workspace.
//!
//! Two levels of substitution for the remote backend:
//! - [`MockBackend`]: in-memory, scripted, no networking. For state-machine
//!   and session tests.
//! - [`ChatServerHarness`]: a wiremock server with the real routes mounted.
//!   For tests that should cross the actual HTTP stack.

pub mod harness;
pub mod mock_backend;

pub use harness::{ChatServerBuilder, ChatServerHarness};
pub use mock_backend::MockBackend;
