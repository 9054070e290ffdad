// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Courier chat client.

use thiserror::Error;

/// The primary error type used across the Courier workspace.
///
/// Nothing here is fatal to the process: auth errors surface as displayed
/// strings, fetch errors propagate to the caller, and per-message delivery
/// failures are converted into message state transitions before they reach
/// this type's consumers.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration errors (invalid TOML, bad base URL, unknown log level).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be completed (connection refused, DNS failure,
    /// timeout -- no response from the backend at all).
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend rejected credentials. Carries the server-supplied detail
    /// message when the response body provides one.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The session cookie is no longer valid. Raised by a failed `whoami`
    /// or by a 401 intercepted outside the auth endpoints.
    #[error("session expired, log in again")]
    SessionExpired,

    /// Client-side required-field check failed before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend answered with a non-auth error status.
    #[error("server rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Wraps a transport-level failure, preserving the underlying error.
    pub fn network<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True when retrying the same operation could plausibly succeed
    /// (connectivity came back). Auth, validation, and API rejections
    /// will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
