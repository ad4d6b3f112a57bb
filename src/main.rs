//! bucket-rs - Bitbucket Cloud from the command line
//!
//! Log in, select a team and manage its repositories.
//!
//! Available as the `bkt` and `bucket` commands.

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use bucket_rs::bitbucket::BitbucketClient;
use bucket_rs::cli::commands::{Cli, Commands};
use bucket_rs::cli::{auth, config, repo, team};
use bucket_rs::core::credentials::open_store;
use bucket_rs::core::Config;
use bucket_rs::error::{BucketError, Result};

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        handle_error(&e);
        std::process::exit(1);
    }
}

/// Print the error, with a hint for rejected sessions
fn handle_error(e: &BucketError) {
    eprintln!("Error: {}", e);

    if let BucketError::Api { status: 401, .. } = e {
        eprintln!();
        eprintln!("  → Your saved session may have expired or been revoked.");
        eprintln!("  → Run 'bkt auth logout' then 'bkt auth login'.");
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands don't need a session
    if let Commands::Config(args) = cli.command {
        return config::handle_config(args.command);
    }

    let config = Config::load()?;
    let store = open_store(&config)?;

    // An unreadable session must not block logout or a fresh login
    let session = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring saved session");
        None
    });
    let mut client = BitbucketClient::new(&config)?.with_session(session);

    match cli.command {
        Commands::Auth(args) => auth::handle_auth(args.command, &mut client, store.as_ref()).await,
        Commands::Team(args) => team::handle_team(args.command, &mut client, store.as_ref()).await,
        Commands::Repo(args) => repo::handle_repo(args.command, &client).await,
        Commands::Config(_) => unreachable!(),
    }
}
