//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default API location, matching the development server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5005";

/// Directory name under the platform data dir.
const DATA_DIR_NAME: &str = "slowfood";

/// File holding the persisted token slot.
const SESSION_FILE: &str = "session.json";

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform API, without a trailing slash.
    pub server_url: String,
    /// Directory for persisted client state.
    pub data_dir: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Config {
    /// Build a config, filling unset values with defaults.
    pub fn new(server_url: Option<String>, data_dir: Option<PathBuf>, timeout_secs: u64) -> Self {
        let server_url = server_url
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Path of the token file.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None, 30)
    }
}

/// Platform data directory, falling back to `~/.slowfood`.
fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(
        || {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(format!(".{DATA_DIR_NAME}"))
        },
        |d| d.join(DATA_DIR_NAME),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(None, Some(PathBuf::from("/tmp/sf")), 5);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.session_path(), PathBuf::from("/tmp/sf/session.json"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = Config::new(Some("https://api.example.com/".into()), None, 30);
        assert_eq!(config.server_url, "https://api.example.com");
    }

    #[test]
    fn test_blank_url_uses_default() {
        let config = Config::new(Some("  ".into()), None, 30);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }
}
