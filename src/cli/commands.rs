//! CLI command definitions using clap
//!
//! Defines the command structure for the `bkt` CLI tool.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::bitbucket::{ForkPolicy, Language, TeamRole};

/// bucket-rs - Bitbucket Cloud from the command line
///
/// Log in, pick a team and manage its repositories.
#[derive(Parser, Debug)]
#[command(name = "bkt", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in to and out of Bitbucket
    Auth(AuthArgs),

    /// List and select teams
    Team(TeamArgs),

    /// Manage repositories
    Repo(RepoArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication commands
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in with a username and app password, or through an OAuth consumer
    Login {
        /// Bitbucket username (prompted when omitted)
        #[arg(long, short, conflicts_with = "oauth")]
        username: Option<String>,

        /// Log in through an OAuth consumer instead of basic auth
        #[arg(long)]
        oauth: bool,

        /// Atlassian account email (prompted when omitted)
        #[arg(long, requires = "oauth")]
        email: Option<String>,

        /// OAuth consumer key (prompted when omitted)
        #[arg(long, requires = "oauth")]
        consumer_key: Option<String>,

        /// Team to select after login
        #[arg(long, short)]
        team: Option<String>,
    },
    /// Log out and remove the saved session
    Logout,
    /// Show current authentication status
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Team Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Team commands
#[derive(Parser, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// List teams you belong to
    List {
        /// Your role in the team (admin, contributor, member)
        #[arg(long, default_value_t = TeamRole::Member)]
        role: TeamRole,
    },

    /// Select the team repository commands target
    Select {
        /// Team to select; prompts when several are visible and none is given
        team: Option<String>,

        /// Your role in the team (admin, contributor, member)
        #[arg(long, default_value_t = TeamRole::Member)]
        role: TeamRole,
    },

    /// Show the selected team
    Current,
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Repository commands
#[derive(Parser, Debug)]
pub struct RepoArgs {
    #[command(subcommand)]
    pub command: RepoCommand,
}

/// Confirmation flags shared by mutating commands
#[derive(Args, Debug, Clone, Copy)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// List repositories of a team
    List {
        /// Team (defaults to the selected team)
        #[arg(long, short)]
        team: Option<String>,

        /// Show only this repository
        #[arg(long, short)]
        slug: Option<String>,

        /// Only repositories in this project
        #[arg(long = "project", short = 'p')]
        project_key: Option<String>,
    },

    /// Create a repository
    Create {
        /// Repository slug
        slug: String,

        /// Team (defaults to the selected team)
        #[arg(long, short)]
        team: Option<String>,

        /// Project key to place the repository in
        #[arg(long = "project", short = 'p')]
        project_key: Option<String>,

        /// Make the repository public (private by default)
        #[arg(long)]
        public: bool,

        /// Repository description
        #[arg(long, short, default_value = "")]
        description: String,

        /// Main language, e.g. rust, python, "c#"
        #[arg(long, short)]
        language: Option<Language>,

        /// allow_forks, no_public_forks or no_forks
        #[arg(long, default_value_t = ForkPolicy::NoForks)]
        fork_policy: ForkPolicy,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },

    /// Update repository settings; only the given options change
    Update {
        /// Repository slug
        slug: String,

        /// Team (defaults to the selected team)
        #[arg(long, short)]
        team: Option<String>,

        /// Move the repository to this project
        #[arg(long = "project", short = 'p')]
        project_key: Option<String>,

        /// Make the repository private
        #[arg(long, conflicts_with = "public")]
        private: bool,

        /// Make the repository public
        #[arg(long)]
        public: bool,

        /// New description
        #[arg(long, short)]
        description: Option<String>,

        /// New main language
        #[arg(long, short)]
        language: Option<Language>,

        /// allow_forks, no_public_forks or no_forks
        #[arg(long)]
        fork_policy: Option<ForkPolicy>,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },

    /// Delete a repository (forks are kept)
    Delete {
        /// Repository slug
        slug: String,

        /// Team (defaults to the selected team)
        #[arg(long, short)]
        team: Option<String>,

        /// URL to redirect visitors of the deleted repository to
        #[arg(long)]
        redirect_to: Option<String>,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,

        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },

    /// Reset a configuration value to its default
    Remove {
        /// Configuration key
        key: ConfigKey,
    },
}

/// Available configuration keys
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigKey {
    /// Public REST API root
    #[value(name = "api-url")]
    ApiUrl,

    /// Internal API root
    #[value(name = "internal-api-url")]
    InternalApiUrl,

    /// OAuth2 token endpoint
    #[value(name = "token-url")]
    TokenUrl,

    /// Where the login session is saved (keyring or file)
    #[value(name = "session-store")]
    SessionStore,
}
