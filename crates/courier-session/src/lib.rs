// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session management for the Courier chat client.
//!
//! See [`SessionAccessor`] for the login/signup/whoami/logout surface.

pub mod accessor;

pub use accessor::SessionAccessor;
