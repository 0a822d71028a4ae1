//! Config loader: reads `~/.parkshare/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.parkshare/config.json`
//! 3. Environment variables `PARKSHARE_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// - `PARKSHARE_API__BASE_URL` → `api.base_url`
/// - `PARKSHARE_API__TIMEOUT_SECS` → `api.timeout_secs`
/// - `PARKSHARE_CHAT__WS_URL` → `chat.ws_url`
/// - `PARKSHARE_AUTH__TOKEN` → `auth.token`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("PARKSHARE_API__BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("PARKSHARE_API__TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(n) => config.api.timeout_secs = n,
            Err(_) => warn!(value = %val, "ignoring non-numeric PARKSHARE_API__TIMEOUT_SECS"),
        }
    }
    if let Ok(val) = std::env::var("PARKSHARE_CHAT__WS_URL") {
        config.chat.ws_url = val;
    }
    if let Ok(val) = std::env::var("PARKSHARE_AUTH__TOKEN") {
        config.auth.token = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "api": { "baseUrl": "https://parking.example.com/api/v1" },
            "chat": { "wsUrl": "wss://parking.example.com/api/v1/ws/chat" }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.api.base_url, "https://parking.example.com/api/v1");
        // Default preserved
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.auth.token = "eyJhbGciOi.test".to_string();
        config.api.timeout_secs = 12;

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.auth.token, "eyJhbGciOi.test");
        assert_eq!(reloaded.api.timeout_secs, 12);
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["api"].get("baseUrl").is_some());
        assert!(raw["api"].get("base_url").is_none());
    }

    #[test]
    fn test_env_override_ws_url() {
        std::env::set_var("PARKSHARE_CHAT__WS_URL", "ws://chat.test/ws/chat");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.chat.ws_url, "ws://chat.test/ws/chat");
        std::env::remove_var("PARKSHARE_CHAT__WS_URL");
    }

    #[test]
    fn test_env_override_timeout_ignores_garbage() {
        std::env::set_var("PARKSHARE_API__TIMEOUT_SECS", "soon");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.api.timeout_secs, 30);
        std::env::remove_var("PARKSHARE_API__TIMEOUT_SECS");
    }
}
