// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Courier chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Courier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Remote chat backend settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Interactive shell settings.
    #[serde(default)]
    pub shell: ShellConfig,
}

/// Remote chat backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the backend API, including the version prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Interactive shell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prompt label shown in the chat REPL.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prompt: default_prompt(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_prompt() -> String {
    "courier".to_string()
}
