//! Login session state
//!
//! A [`Session`] only exists once a login has succeeded: it always carries
//! the auth material, the resolved user identity and (optionally) the
//! selected team. It is owned by the API client rather than held in a
//! global, and converted to [`StoredSession`] for persistence.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::bitbucket::user::User;
use crate::error::{BucketError, Result};

/// Current stored session format
const STORED_SESSION_VERSION: u8 = 1;

/// How requests are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// HTTP basic auth with username and app password
    Basic,
    /// OAuth2 bearer token
    Bearer,
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthType::Basic => write!(f, "basic"),
            AuthType::Bearer => write!(f, "oauth2 bearer"),
        }
    }
}

/// Header material for one auth scheme
///
/// For `Basic` the secret is `base64(user:pass)`, for `Bearer` it is the
/// access token itself.
#[derive(Debug, Clone)]
pub struct AuthMaterial {
    auth_type: AuthType,
    secret: SecretString,
}

impl AuthMaterial {
    /// Encode basic credentials
    pub fn basic(username: &str, password: &SecretString) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", username, password.expose_secret()));
        Self {
            auth_type: AuthType::Basic,
            secret: SecretString::from(encoded),
        }
    }

    /// Wrap an OAuth2 access token
    pub fn bearer(token: SecretString) -> Self {
        Self {
            auth_type: AuthType::Bearer,
            secret: token,
        }
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        match self.auth_type {
            AuthType::Basic => format!("Basic {}", self.secret.expose_secret()),
            AuthType::Bearer => format!("Bearer {}", self.secret.expose_secret()),
        }
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}

/// An authenticated Bitbucket session
#[derive(Debug, Clone)]
pub struct Session {
    auth: AuthMaterial,
    display_name: String,
    username: String,
    selected_team: Option<String>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from verified auth material and the user it resolved to
    pub fn new(auth: AuthMaterial, user: &User) -> Self {
        Self {
            auth,
            display_name: user.display_name.clone(),
            username: user.nickname.clone(),
            selected_team: None,
            created_at: Utc::now(),
        }
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth.auth_type()
    }

    pub fn auth(&self) -> &AuthMaterial {
        &self.auth
    }

    /// Value for the `Authorization` header
    pub fn auth_header(&self) -> String {
        self.auth.header_value()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Account nickname, which is also the user's personal namespace
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn selected_team(&self) -> Option<&str> {
        self.selected_team.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn select_team(&mut self, team: impl Into<String>) {
        self.selected_team = Some(team.into());
    }

    /// Resolve the team an operation should target
    ///
    /// An explicit team wins over the selected one.
    pub fn resolve_team<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        explicit
            .or(self.selected_team.as_deref())
            .ok_or(BucketError::NoTeamSelected)
    }

    /// Convert to storable format for persistence
    pub fn to_stored(&self) -> StoredSession {
        StoredSession {
            auth_type: self.auth.auth_type,
            credential: self.auth.secret.expose_secret().to_string(),
            display_name: self.display_name.clone(),
            username: self.username.clone(),
            selected_team: self.selected_team.clone(),
            created_at: self.created_at,
            version: STORED_SESSION_VERSION,
        }
    }

    /// Create from stored format after loading
    pub fn from_stored(stored: StoredSession) -> Result<Self> {
        if stored.version != STORED_SESSION_VERSION {
            return Err(BucketError::Config(format!(
                "Unsupported stored session version {}",
                stored.version
            )));
        }
        if stored.credential.is_empty() {
            return Err(BucketError::Config(
                "Stored session has no credential".to_string(),
            ));
        }

        Ok(Self {
            auth: AuthMaterial {
                auth_type: stored.auth_type,
                secret: SecretString::from(stored.credential),
            },
            display_name: stored.display_name,
            username: stored.username,
            selected_team: stored.selected_team,
            created_at: stored.created_at,
        })
    }
}

/// Serializable format for the session store
///
/// Uses a plain string since SecretString doesn't implement Serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub auth_type: AuthType,
    /// Encoded basic credentials or bearer token
    pub credential: String,
    pub display_name: String,
    pub username: String,
    #[serde(default)]
    pub selected_team: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Version for future migrations
    pub version: u8,
}
