//! Session persistence
//!
//! A login is saved between invocations as a JSON blob, either in the
//! system keyring (macOS Keychain, Linux Secret Service) or in a plain
//! file under the config directory. The backend is chosen by
//! `session_store` in the config file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};

use crate::core::config::{Config, SessionStoreKind};
use crate::core::session::{Session, StoredSession};
use crate::error::{BucketError, Result};

const SERVICE_NAME: &str = "bucket-rs";
const SESSION_KEY: &str = "session";

/// Save/load blob storage for the login session
pub trait SessionStore {
    /// Load the saved session, if any
    fn load(&self) -> Result<Option<Session>>;

    /// Save the session, replacing any previous one
    fn save(&self, session: &Session) -> Result<()>;

    /// Remove the saved session; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

/// Open the session store selected by the configuration
pub fn open_store(config: &Config) -> Result<Box<dyn SessionStore>> {
    match config.session_store {
        SessionStoreKind::Keyring => Ok(Box::new(KeyringSessionStore::new())),
        SessionStoreKind::File => Ok(Box::new(FileSessionStore::new(
            Config::session_file_path()?,
        ))),
    }
}

fn encode(session: &Session) -> Result<String> {
    serde_json::to_string(&session.to_stored())
        .map_err(|e| BucketError::Config(format!("Failed to serialize session: {}", e)))
}

fn decode(json: &str) -> Result<Session> {
    let stored: StoredSession = serde_json::from_str(json)
        .map_err(|e| BucketError::Config(format!("Invalid stored session: {}", e)))?;
    Session::from_stored(stored)
}

/// Session store backed by the system keyring
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Ok(Entry::new(&self.service, SESSION_KEY)?)
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        match self.entry()?.get_password() {
            Ok(json) => Ok(Some(decode(&json)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(BucketError::Credential(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        self.entry()?.set_password(&encode(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(BucketError::Credential(e.to_string())),
        }
    }
}

/// Session store backed by a JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(decode(&contents)?))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = open_private(&self.path)?;
        file.write_all(encode(session)?.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Open for writing, readable by the owner only from the moment it exists
#[cfg(unix)]
fn open_private(path: &Path) -> Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<File> {
    Ok(OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?)
}

/// Get a masked version of a secret for display (shows first 4 and last 4 chars)
pub fn mask_secret(secret: &SecretString) -> String {
    let exposed = secret.expose_secret();
    if exposed.len() <= 8 {
        "*".repeat(exposed.len())
    } else {
        format!("{}...{}", &exposed[..4], &exposed[exposed.len() - 4..])
    }
}
