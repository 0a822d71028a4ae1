//! Configuration schema.
//!
//! Hierarchy: `Config` → `ApiConfig`, `ChatConfig`, `AuthConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

/// Default REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default chat WebSocket base URL; the booking id is appended as a path segment.
pub const DEFAULT_CHAT_WS_URL: &str = "ws://localhost:8000/api/v1/ws/chat";

/// Root configuration: loaded from `~/.parkshare/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api: ApiConfig,
    pub chat: ChatConfig,
    pub auth: AuthConfig,
}

/// REST backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Base URL every REST path is appended to.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Realtime chat settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// WebSocket endpoint prefix, e.g. `ws://host/api/v1/ws/chat`.
    pub ws_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_CHAT_WS_URL.to_string(),
        }
    }
}

/// Stored credentials.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Bearer token from `POST /token`. Empty when logged out.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl AuthConfig {
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn token(&self) -> Option<&str> {
        if self.token.is_empty() {
            None
        } else {
            Some(&self.token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.chat.ws_url, "ws://localhost:8000/api/v1/ws/chat");
        assert!(!cfg.auth.is_logged_in());
        assert!(cfg.auth.token().is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"api": {"timeoutSecs": 5}}"#).unwrap();
        assert_eq!(cfg.api.timeout_secs, 5);
        assert_eq!(cfg.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.chat.ws_url, DEFAULT_CHAT_WS_URL);
    }

    #[test]
    fn test_empty_token_not_serialized() {
        let raw = serde_json::to_value(Config::default()).unwrap();
        assert!(raw["auth"].get("token").is_none());
        assert!(raw["chat"].get("wsUrl").is_some());
    }
}
