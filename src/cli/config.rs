//! Configuration CLI command handlers

use url::Url;

use crate::cli::commands::{ConfigCommand, ConfigKey};
use crate::core::config::{
    Config, SessionStoreKind, DEFAULT_API_URL, DEFAULT_INTERNAL_API_URL, DEFAULT_TOKEN_URL,
};
use crate::error::{BucketError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { key, value } => handle_set(key, value),
        ConfigCommand::Get { key } => handle_get(key),
        ConfigCommand::Remove { key } => handle_remove(key),
    }
}

/// Apply `value` for `key` to `config`
fn apply(config: &mut Config, key: ConfigKey, value: String) -> Result<()> {
    match key {
        ConfigKey::ApiUrl => config.api_url = parse_url(value)?,
        ConfigKey::InternalApiUrl => config.internal_api_url = parse_url(value)?,
        ConfigKey::TokenUrl => config.token_url = parse_url(value)?,
        ConfigKey::SessionStore => {
            config.session_store = SessionStoreKind::from_str(&value).ok_or_else(|| {
                BucketError::InvalidInput(format!(
                    "Invalid session store '{}'. Available stores: keyring, file",
                    value
                ))
            })?;
        }
    }
    Ok(())
}

fn parse_url(value: String) -> Result<String> {
    let url = Url::parse(&value)?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(BucketError::InvalidInput(format!(
            "'{}' is not an http(s) URL",
            value
        )));
    }
    Ok(value)
}

fn current_value(config: &Config, key: ConfigKey) -> String {
    match key {
        ConfigKey::ApiUrl => config.api_url.clone(),
        ConfigKey::InternalApiUrl => config.internal_api_url.clone(),
        ConfigKey::TokenUrl => config.token_url.clone(),
        ConfigKey::SessionStore => config.session_store.to_string(),
    }
}

fn default_value(key: ConfigKey) -> String {
    match key {
        ConfigKey::ApiUrl => DEFAULT_API_URL.to_string(),
        ConfigKey::InternalApiUrl => DEFAULT_INTERNAL_API_URL.to_string(),
        ConfigKey::TokenUrl => DEFAULT_TOKEN_URL.to_string(),
        ConfigKey::SessionStore => SessionStoreKind::default().to_string(),
    }
}

/// Handle setting a configuration value
fn handle_set(key: ConfigKey, value: String) -> Result<()> {
    let mut config = Config::load()?;
    apply(&mut config, key, value)?;
    config.save()?;

    println!("{:?} set to: {}", key, current_value(&config, key));
    if matches!(key, ConfigKey::SessionStore) {
        println!("  Log in again to save your session in the new store.");
    }
    Ok(())
}

/// Handle getting a configuration value
fn handle_get(key: ConfigKey) -> Result<()> {
    let config = Config::load()?;
    println!("{}", current_value(&config, key));
    Ok(())
}

/// Handle resetting a configuration value
fn handle_remove(key: ConfigKey) -> Result<()> {
    let mut config = Config::load()?;
    apply(&mut config, key, default_value(key))?;
    config.save()?;

    println!("{:?} reset to default: {}", key, current_value(&config, key));
    Ok(())
}
