//! Custom error types for bucket-rs
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the bucket-rs application
#[derive(Error, Debug)]
pub enum BucketError {
    /// No session exists but the operation needs one
    #[error("You are not logged in to Bitbucket.\n\n  → Run 'bkt auth login' to authenticate.")]
    NotAuthenticated,

    /// Credentials or token exchange rejected by Bitbucket
    #[error("Bitbucket authentication failed: {0}\n\n  → Check your credentials and run 'bkt auth login' again.")]
    AuthenticationFailed(String),

    /// Internal API endpoints only accept OAuth2 bearer tokens
    #[error("This operation requires an OAuth2 login.\n\n  → Run 'bkt auth login --oauth' with an OAuth consumer.")]
    UnsupportedAuth,

    /// Non-2xx response from the Bitbucket API
    #[error("Bitbucket API request failed with status {status}: {payload}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the server
        payload: String,
    },

    /// Update requested without any field to change
    #[error("No changes specified.\n\n  → Pass at least one of --project, --private/--public, --description, --language or --fork-policy.")]
    NoChangesSpecified,

    /// Caller-supplied value outside its allowed set
    #[error("{0}")]
    Validation(String),

    /// No team given and none selected in the session
    #[error("No team selected.\n\n  → Run 'bkt team select' or pass --team.")]
    NoTeamSelected,

    /// Team listing returned nothing for the role filter
    #[error("No teams visible with role '{0}'.\n\n  → Try 'bkt team list --role member'.")]
    NoTeamsVisible(String),

    /// Response did not have the expected shape
    #[error("Unexpected response from Bitbucket: {0}")]
    InvalidResponse(String),

    /// Credential storage error
    #[error("Cannot access secure storage: {0}\n\n  → On macOS: Make sure Keychain Access is available.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running, or run 'bkt config set session-store file'.")]
    Credential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Malformed URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Terminal prompt error
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),
}

impl From<keyring::Error> for BucketError {
    fn from(err: keyring::Error) -> Self {
        BucketError::Credential(err.to_string())
    }
}

impl From<toml::de::Error> for BucketError {
    fn from(err: toml::de::Error) -> Self {
        BucketError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for BucketError {
    fn from(err: toml::ser::Error) -> Self {
        BucketError::Toml(err.to_string())
    }
}

impl From<dialoguer::Error> for BucketError {
    fn from(err: dialoguer::Error) -> Self {
        BucketError::Prompt(err.to_string())
    }
}

/// Result type alias using BucketError
pub type Result<T> = std::result::Result<T, BucketError>;
