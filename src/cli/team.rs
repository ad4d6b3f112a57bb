//! Team CLI command handlers

use crate::bitbucket::{BitbucketClient, TeamHandler, TeamRole};
use crate::cli::commands::TeamCommand;
use crate::core::credentials::SessionStore;
use crate::core::prompt::InteractiveChoice;
use crate::error::Result;

/// Handle team commands
pub async fn handle_team(
    command: TeamCommand,
    client: &mut BitbucketClient,
    store: &dyn SessionStore,
) -> Result<()> {
    match command {
        TeamCommand::List { role } => handle_list(client, role).await,
        TeamCommand::Select { team, role } => handle_select(client, store, team, role).await,
        TeamCommand::Current => handle_current(client),
    }
}

async fn handle_list(client: &mut BitbucketClient, role: TeamRole) -> Result<()> {
    let handler = TeamHandler::new(client);
    let teams = handler.list(role).await?;
    let current = handler.current()?.map(str::to_string);

    if teams.is_empty() {
        println!("No teams where you are {}.", role);
        return Ok(());
    }

    println!("Teams ({}):\n", role);
    for team in teams {
        let current_marker = if current.as_deref() == Some(team.username.as_str()) {
            " ←"
        } else {
            ""
        };
        println!("  {}{}", team.label(), current_marker);
    }

    Ok(())
}

async fn handle_select(
    client: &mut BitbucketClient,
    store: &dyn SessionStore,
    team: Option<String>,
    role: TeamRole,
) -> Result<()> {
    let selected = TeamHandler::new(client)
        .select(team.as_deref(), role, &InteractiveChoice)
        .await?;

    store.save(client.session()?)?;
    println!("✓ Selected team '{}'", selected);
    Ok(())
}

fn handle_current(client: &mut BitbucketClient) -> Result<()> {
    match TeamHandler::new(client).current()? {
        Some(team) => println!("{}", team),
        None => println!("No team selected. Run 'bkt team select' to pick one."),
    }
    Ok(())
}
