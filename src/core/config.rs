//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - Bitbucket API endpoints (primary, internal, OAuth2 token)
//! - Where the login session is persisted

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{BucketError, Result};

/// Bitbucket Cloud REST API root
pub const DEFAULT_API_URL: &str = "https://api.bitbucket.org/2.0/";

/// Undocumented API root used by the Bitbucket web UI
pub const DEFAULT_INTERNAL_API_URL: &str = "https://api.bitbucket.org/internal/";

/// OAuth2 token endpoint for consumer-based logins
pub const DEFAULT_TOKEN_URL: &str = "https://bitbucket.org/site/oauth2/access_token";

/// Backend used to persist the login session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    /// System keyring (default)
    #[default]
    Keyring,
    /// JSON file in the config directory
    File,
}

impl SessionStoreKind {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "keyring" => Some(SessionStoreKind::Keyring),
            "file" => Some(SessionStoreKind::File),
            _ => None,
        }
    }

    /// Config file identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStoreKind::Keyring => "keyring",
            SessionStoreKind::File => "file",
        }
    }
}

impl std::fmt::Display for SessionStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the public REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the internal API (bearer auth only)
    #[serde(default = "default_internal_api_url")]
    pub internal_api_url: String,

    /// OAuth2 token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Session persistence backend
    #[serde(default)]
    pub session_store: SessionStoreKind,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_internal_api_url() -> String {
    DEFAULT_INTERNAL_API_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            internal_api_url: default_internal_api_url(),
            token_url: default_token_url(),
            session_store: SessionStoreKind::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("org", "bucket-rs", "bucket-rs")
            .ok_or_else(|| BucketError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().to_path_buf())
    }

    /// Path of the session file used by the `file` session store
    pub fn session_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("session.json"))
    }
}
