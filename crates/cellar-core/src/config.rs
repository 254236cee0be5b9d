//! Project configuration loaded from `cellar.toml`.
//!
//! Every section is optional; a missing file yields the defaults. Secrets
//! (the cellar password and the session secret) can be supplied or overridden
//! through `CELLAR_PASSWORD` and `CELLAR_SESSION_SECRET` so the TOML file can
//! be committed without them.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable overriding `[auth] password`.
pub const PASSWORD_ENV: &str = "CELLAR_PASSWORD";
/// Environment variable overriding `[auth] session_secret`.
pub const SESSION_SECRET_ENV: &str = "CELLAR_SESSION_SECRET";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub guest: GuestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared cellar password. Login is disabled while unset.
    #[serde(default)]
    pub password: Option<String>,
    /// Opaque value stored in the session cookie. Falls back to the
    /// password when unset.
    #[serde(default)]
    pub session_secret: Option<String>,
    #[serde(default = "default_session_max_age")]
    pub session_max_age_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GuestConfig {
    /// When true, GET endpoints are readable without a session cookie.
    #[serde(default)]
    pub enabled: bool,
}

impl Config {
    /// Load configuration from `<root>/cellar.toml`, falling back to defaults
    /// when the file does not exist, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("cellar.toml");
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
            toml::from_str::<Self>(&content)
                .map_err(|e| Error::Config(format!("parse {}: {e}", path.display())))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Ok(password) = env::var(PASSWORD_ENV) {
            config.auth.password = Some(password);
        }
        if let Ok(secret) = env::var(SESSION_SECRET_ENV) {
            config.auth.session_secret = Some(secret);
        }

        Ok(config)
    }

    /// The value a valid session cookie must carry.
    #[must_use]
    pub fn session_secret(&self) -> Option<&str> {
        self.auth
            .session_secret
            .as_deref()
            .or(self.auth.password.as_deref())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8640
}

fn default_db_path() -> PathBuf {
    PathBuf::from("cellar.sqlite3")
}

// 30 days, matching the session cookie Max-Age.
const fn default_session_max_age() -> i64 {
    2_592_000
}
