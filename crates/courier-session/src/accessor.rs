// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session accessor: wraps the backend's auth operations and holds the
//! current identity.
//!
//! Identity is explicit accessor state, constructed once and injected where
//! needed -- there is no ambient global. It lives exactly as long as the
//! session: set on login/signup/whoami success, cleared on logout, gone at
//! process exit. Credentials are never stored; continuity is the backend's
//! session cookie.

use std::sync::Arc;

use courier_core::{ChatBackend, CourierError, UserProfile};
use tracing::{debug, info, warn};

/// Holds the current user identity and mediates the auth endpoints.
pub struct SessionAccessor {
    backend: Arc<dyn ChatBackend>,
    user: Option<UserProfile>,
}

impl SessionAccessor {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            user: None,
        }
    }

    /// The identity established by the last successful auth call, if any.
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Exchanges credentials for a session. On rejection the error carries
    /// the server-supplied detail (or a generic fallback) for display.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, CourierError> {
        require(email, "email")?;
        require(password, "password")?;

        let profile = self.backend.login(email.trim(), password).await?;
        info!(email = %profile.email, "logged in");
        self.user = Some(profile.clone());
        Ok(profile)
    }

    /// Creates an account; same session contract as [`login`](Self::login).
    pub async fn signup(
        &mut self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<UserProfile, CourierError> {
        require(email, "email")?;
        require(name, "name")?;
        require(password, "password")?;

        let profile = self
            .backend
            .signup(email.trim(), name.trim(), password)
            .await?;
        info!(email = %profile.email, "account created");
        self.user = Some(profile.clone());
        Ok(profile)
    }

    /// Revalidates the session. Any failure fires the logout side effect
    /// and surfaces `SessionExpired` -- the caller's cue to return to the
    /// login view.
    pub async fn whoami(&mut self) -> Result<UserProfile, CourierError> {
        match self.backend.whoami().await {
            Ok(profile) => {
                debug!(email = %profile.email, "session validated");
                self.user = Some(profile.clone());
                Ok(profile)
            }
            Err(e) => {
                warn!(error = %e, "session validation failed, logging out");
                if let Err(logout_err) = self.logout().await {
                    debug!(error = %logout_err, "logout after failed whoami also failed");
                }
                Err(CourierError::SessionExpired)
            }
        }
    }

    /// Invalidates the session server-side. Local identity is cleared even
    /// when the server call fails -- a half-logged-out client is worse than
    /// a cookie the server will reject anyway.
    pub async fn logout(&mut self) -> Result<(), CourierError> {
        let result = self.backend.logout().await;
        self.user = None;
        if let Err(e) = &result {
            warn!(error = %e, "server-side logout failed");
        }
        result
    }
}

/// Required-field check; everything beyond presence is the server's job.
fn require(value: &str, field: &str) -> Result<(), CourierError> {
    if value.trim().is_empty() {
        return Err(CourierError::Validation(format!("{field} is required")));
    }
    Ok(())
}
