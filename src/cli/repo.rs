//! Repository CLI command handlers

use crate::bitbucket::{
    BitbucketClient, CreateRepositoryParams, HttpTransport, Repository, RepositoryHandler,
    UpdateRepositoryParams,
};
use crate::cli::commands::RepoCommand;
use crate::core::prompt::policy_for;
use crate::error::Result;

/// Handle repository commands
pub async fn handle_repo(command: RepoCommand, client: &BitbucketClient) -> Result<()> {
    match command {
        RepoCommand::List {
            team,
            slug,
            project_key,
        } => {
            let handler = RepositoryHandler::new(client, team.as_deref())?;
            handle_list(&handler, slug.as_deref(), project_key.as_deref()).await
        }
        RepoCommand::Create {
            slug,
            team,
            project_key,
            public,
            description,
            language,
            fork_policy,
            confirm,
        } => {
            let handler = RepositoryHandler::new(client, team.as_deref())?;
            let params = CreateRepositoryParams {
                slug,
                project_key,
                is_private: !public,
                description,
                language: language.unwrap_or_default(),
                fork_policy,
            };

            let policy = policy_for(confirm.yes, confirm.dry_run);
            match handler.create(&params, policy.as_ref()).await? {
                Some(repo) => {
                    println!("✓ Created repository {}", display_name(&repo));
                    print_details(&repo);
                }
                None => println!("Skipped."),
            }
            Ok(())
        }
        RepoCommand::Update {
            slug,
            team,
            project_key,
            private,
            public,
            description,
            language,
            fork_policy,
            confirm,
        } => {
            let handler = RepositoryHandler::new(client, team.as_deref())?;
            let params = UpdateRepositoryParams {
                slug,
                project_key,
                is_private: privacy_change(private, public),
                description,
                language,
                fork_policy,
            };

            let policy = policy_for(confirm.yes, confirm.dry_run);
            match handler.update(&params, policy.as_ref()).await? {
                Some(repo) => {
                    println!("✓ Updated repository {}", display_name(&repo));
                    print_details(&repo);
                }
                None => println!("Skipped."),
            }
            Ok(())
        }
        RepoCommand::Delete {
            slug,
            team,
            redirect_to,
            confirm,
        } => {
            let handler = RepositoryHandler::new(client, team.as_deref())?;
            let policy = policy_for(confirm.yes, confirm.dry_run);

            if handler
                .delete(&slug, redirect_to.as_deref(), policy.as_ref())
                .await?
            {
                println!("✓ Deleted repository {}/{}", handler.team(), slug);
                if let Some(redirect) = redirect_to {
                    println!("  Visitors will be redirected to {}", redirect);
                }
            } else {
                println!("Skipped.");
            }
            Ok(())
        }
    }
}

/// `--private` / `--public` to an optional change
fn privacy_change(private: bool, public: bool) -> Option<bool> {
    match (private, public) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn display_name(repo: &Repository) -> &str {
    if repo.full_name.is_empty() {
        &repo.slug
    } else {
        &repo.full_name
    }
}

async fn handle_list(
    handler: &RepositoryHandler<'_, HttpTransport>,
    slug: Option<&str>,
    project_key: Option<&str>,
) -> Result<()> {
    let repos = handler.list(slug, project_key).await?;

    if repos.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    println!("Repositories for {}:\n", handler.team());
    for repo in &repos {
        let visibility = if repo.is_private { "private" } else { "public" };
        let project = repo
            .project
            .as_ref()
            .map(|p| format!("  [{}]", p.key))
            .unwrap_or_default();
        let language = if repo.language.is_empty() {
            String::new()
        } else {
            format!("  {}", repo.language)
        };

        println!(
            "  {}  ({}){}{}",
            display_name(repo),
            visibility,
            project,
            language
        );
    }
    println!("\n{} repositories", repos.len());

    Ok(())
}

fn print_details(repo: &Repository) {
    println!(
        "  Visibility: {}",
        if repo.is_private { "private" } else { "public" }
    );
    if let Some(project) = &repo.project {
        println!("  Project: {}", project.key);
    }
    if !repo.description.is_empty() {
        println!("  Description: {}", repo.description);
    }
    if !repo.language.is_empty() {
        println!("  Language: {}", repo.language);
    }
    if let Some(policy) = repo.fork_policy {
        println!("  Fork policy: {}", policy);
    }
}
