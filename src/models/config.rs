//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::multiplayer::rules::MultiplayerRules;

fn default_static_dir() -> String {
    "./public".to_string()
}

fn default_session_ttl_days() -> i64 {
    30
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for the HTTP and WebSocket server.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Key for signing session cookies. At least 64 bytes.
    pub secret: String,
    /// Browser client served at `/` when the directory exists.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    #[serde(default)]
    pub rules: MultiplayerRules,
}

impl ServerConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }
}
