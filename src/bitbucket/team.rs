//! Team listing and selection

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::bitbucket::client::{BitbucketClient, EndpointRequest, Transport};
use crate::bitbucket::repository::is_path_segment;
use crate::core::prompt::ChoiceResolver;
use crate::error::{BucketError, Result};

/// The user's role in a team, used to filter team listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamRole {
    Admin,
    Contributor,
    #[default]
    Member,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Admin => "admin",
            TeamRole::Contributor => "contributor",
            TeamRole::Member => "member",
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(TeamRole::Admin),
            "contributor" => Ok(TeamRole::Contributor),
            "member" => Ok(TeamRole::Member),
            _ => Err(BucketError::Validation(format!(
                "Invalid team role '{}'. Expected one of: admin, contributor, member",
                s
            ))),
        }
    }
}

/// Check that a team id can be placed in a repository path
pub(crate) fn validate_team(team: &str) -> Result<()> {
    if is_path_segment(team) {
        Ok(())
    } else {
        Err(BucketError::Validation(format!(
            "Invalid team '{}'. Use letters, digits, '.', '-' or '_'.",
            team
        )))
    }
}

/// A team visible to the current user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Team {
    /// Team identifier used in repository paths
    #[serde(alias = "slug")]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl Team {
    /// "Display Name (username)", or just the username
    pub fn label(&self) -> String {
        if self.display_name.is_empty() || self.display_name == self.username {
            self.username.clone()
        } else {
            format!("{} ({})", self.display_name, self.username)
        }
    }
}

/// Team operations handler
pub struct TeamHandler<'a, T: Transport> {
    client: &'a mut BitbucketClient<T>,
}

impl<'a, T: Transport> TeamHandler<'a, T> {
    /// Create a new handler
    pub fn new(client: &'a mut BitbucketClient<T>) -> Self {
        Self { client }
    }

    /// List teams where the user has `role`
    pub async fn list(&self, role: TeamRole) -> Result<Vec<Team>> {
        let path = format!("teams?role={}", role);
        self.client
            .invoke_as(&EndpointRequest::get(path).paginated())
            .await
    }

    /// Select the team subsequent operations target
    ///
    /// An explicit team is recorded as-is. Otherwise the visible teams are
    /// listed: a single team is taken directly, several are handed to
    /// `resolver`.
    pub async fn select(
        &mut self,
        explicit: Option<&str>,
        role: TeamRole,
        resolver: &dyn ChoiceResolver,
    ) -> Result<String> {
        // Fail before listing when nobody is logged in
        self.client.session()?;

        let team = match explicit {
            Some(team) => {
                validate_team(team)?;
                team.to_string()
            }
            None => {
                let mut teams = self.list(role).await?;
                match teams.len() {
                    0 => return Err(BucketError::NoTeamsVisible(role.to_string())),
                    1 => teams.remove(0).username,
                    _ => {
                        let options: Vec<String> = teams.iter().map(Team::label).collect();
                        let index = resolver.choose("Select a team", &options)?;
                        if index >= teams.len() {
                            return Err(BucketError::InvalidInput(format!(
                                "No team at position {}",
                                index
                            )));
                        }
                        teams.swap_remove(index).username
                    }
                }
            }
        };

        self.client.select_team(&team)?;
        Ok(team)
    }

    /// Select a team for a fresh login
    ///
    /// Same as [`select`](Self::select) with the member role, except that a
    /// failed listing or an aborted prompt falls back to the user's personal
    /// namespace. An invalid explicit team is still an error.
    pub async fn select_or_personal(
        &mut self,
        explicit: Option<&str>,
        resolver: &dyn ChoiceResolver,
    ) -> Result<String> {
        match self.select(explicit, TeamRole::Member, resolver).await {
            Ok(team) => Ok(team),
            Err(e @ (BucketError::NotAuthenticated | BucketError::Validation(_))) => Err(e),
            Err(e) => {
                if matches!(e, BucketError::NoTeamsVisible(_)) {
                    debug!("no teams visible, using personal namespace");
                } else {
                    warn!(error = %e, "team selection failed, using personal namespace");
                }
                let own = self.client.session()?.username().to_string();
                self.client.select_team(&own)?;
                Ok(own)
            }
        }
    }

    /// The currently selected team
    pub fn current(&self) -> Result<Option<&str>> {
        Ok(self.client.session()?.selected_team())
    }
}
