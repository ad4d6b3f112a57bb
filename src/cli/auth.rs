//! Authentication CLI command handlers

use dialoguer::{Input, Password};
use secrecy::SecretString;

use crate::bitbucket::{
    AtlassianCredential, BasicCredential, BitbucketClient, OAuthConsumer, TeamHandler,
};
use crate::cli::commands::AuthCommand;
use crate::core::credentials::{mask_secret, SessionStore};
use crate::core::prompt::InteractiveChoice;
use crate::error::{BucketError, Result};

/// Handle authentication commands
pub async fn handle_auth(
    command: AuthCommand,
    client: &mut BitbucketClient,
    store: &dyn SessionStore,
) -> Result<()> {
    match command {
        AuthCommand::Login {
            username,
            oauth,
            email,
            consumer_key,
            team,
        } => {
            // Check if already authenticated
            if let Ok(session) = client.session() {
                println!("✓ Already logged in as {}.", session.display_name());
                println!();
                println!("  To log in again, first run: bkt auth logout");
                return Ok(());
            }

            if oauth {
                handle_login_oauth(client, email, consumer_key).await?;
            } else {
                handle_login_basic(client, username).await?;
            }

            // Keep the login even if team selection goes wrong
            store.save(client.session()?)?;

            let team = TeamHandler::new(client)
                .select_or_personal(team.as_deref(), &InteractiveChoice)
                .await?;
            store.save(client.session()?)?;

            println!();
            println!(
                "✓ Logged in as {}.",
                client.session()?.display_name()
            );
            println!("  Selected team: {}", team);
            Ok(())
        }
        AuthCommand::Logout => handle_logout(client, store),
        AuthCommand::Status => handle_status(client),
    }
}

/// Use the given value or ask for it
fn prompt_text(label: &str, given: Option<String>) -> Result<String> {
    let value = match given {
        Some(value) => value,
        None => Input::<String>::new().with_prompt(label).interact_text()?,
    };

    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(BucketError::InvalidInput(format!("No {} provided", label.to_lowercase())));
    }
    Ok(value)
}

/// Ask for a secret without echoing it
fn prompt_secret(label: &str) -> Result<SecretString> {
    let value = Password::new().with_prompt(label).interact()?;
    if value.is_empty() {
        return Err(BucketError::InvalidInput(format!("No {} provided", label.to_lowercase())));
    }
    Ok(SecretString::from(value))
}

/// Log in with username and app password
async fn handle_login_basic(client: &mut BitbucketClient, username: Option<String>) -> Result<()> {
    let credential = BasicCredential {
        username: prompt_text("Username", username)?,
        password: prompt_secret("App password")?,
    };

    println!("Validating credentials...");
    client.open_basic(&credential).await?;
    Ok(())
}

/// Log in through an OAuth consumer
async fn handle_login_oauth(
    client: &mut BitbucketClient,
    email: Option<String>,
    consumer_key: Option<String>,
) -> Result<()> {
    let credential = AtlassianCredential {
        email: prompt_text("Email", email)?,
        password: prompt_secret("Password")?,
    };
    let consumer = OAuthConsumer {
        key: prompt_text("Consumer key", consumer_key)?,
        secret: prompt_secret("Consumer secret")?,
    };

    println!("Requesting access token...");
    client.open_oauth(&credential, &consumer).await?;
    Ok(())
}

/// Handle the logout command
fn handle_logout(client: &mut BitbucketClient, store: &dyn SessionStore) -> Result<()> {
    let had_session = client.close_session().is_some();
    store.clear()?;

    if had_session {
        println!("Successfully logged out.");
    } else {
        println!("Not currently authenticated.");
    }
    Ok(())
}

/// Handle the status command
fn handle_status(client: &BitbucketClient) -> Result<()> {
    println!("Authentication Status:");

    let Ok(session) = client.session() else {
        println!("  Bitbucket: Not authenticated");
        return Ok(());
    };

    println!(
        "  Bitbucket: Logged in as {} (@{})",
        session.display_name(),
        session.username()
    );
    println!("  Auth type: {}", session.auth_type());
    println!("  Credential: {}", mask_secret(session.auth().secret()));
    println!(
        "  Team: {}",
        session.selected_team().unwrap_or("(none selected)")
    );
    println!(
        "  Since: {}",
        session.created_at().format("%Y-%m-%d %H:%M UTC")
    );

    Ok(())
}
