//! Repository operations

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::bitbucket::client::{BitbucketClient, EndpointRequest, Transport};
use crate::bitbucket::team::validate_team;
use crate::core::prompt::{ConfirmAction, ConfirmPolicy, Impact};
use crate::error::{BucketError, Result};

/// Repository slugs: letters, digits, dot, dash, underscore
static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+$").expect("Invalid regex pattern for repository slugs")
});

/// Languages Bitbucket accepts for a repository
pub const LANGUAGES: &[&str] = &[
    "", "abap", "actionscript", "ada", "arc", "apex", "asp", "assembly", "c", "c#", "c++",
    "clojure", "coffeescript", "coldfusion", "common lisp", "css", "d", "dart", "delphi",
    "elixir", "erlang", "f#", "fortran", "go", "groovy", "haskell", "html/css", "java",
    "javascript", "kotlin", "lua", "matlab", "objective-c", "ocaml", "perl", "php",
    "powershell", "python", "r", "ruby", "rust", "scala", "scheme", "shell", "smalltalk",
    "sql", "swift", "tcl", "typescript", "vala", "verilog", "vhdl", "visual basic", "xml",
];

/// Who may fork a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkPolicy {
    /// Anyone with read access may fork
    AllowForks,
    /// Forks must stay private
    NoPublicForks,
    /// Forking disabled
    #[default]
    NoForks,
}

impl ForkPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForkPolicy::AllowForks => "allow_forks",
            ForkPolicy::NoPublicForks => "no_public_forks",
            ForkPolicy::NoForks => "no_forks",
        }
    }
}

impl fmt::Display for ForkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ForkPolicy {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "allow_forks" => Ok(ForkPolicy::AllowForks),
            "no_public_forks" => Ok(ForkPolicy::NoPublicForks),
            "no_forks" => Ok(ForkPolicy::NoForks),
            _ => Err(BucketError::Validation(format!(
                "Invalid fork policy '{}'. Expected one of: allow_forks, no_public_forks, no_forks",
                s
            ))),
        }
    }
}

/// A language from [`LANGUAGES`], stored lowercase
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Language(String);

impl Language {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Language {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        if LANGUAGES.contains(&normalized.as_str()) {
            Ok(Language(normalized))
        } else {
            Err(BucketError::Validation(format!(
                "Invalid language '{}'. Expected one of: {}",
                s,
                LANGUAGES[1..].join(", ")
            )))
        }
    }
}

/// Project a repository belongs to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Repository as returned by the API; unknown fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub fork_policy: Option<ForkPolicy>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub updated_on: Option<String>,
}

/// Parameters for creating a repository
#[derive(Debug, Clone)]
pub struct CreateRepositoryParams {
    pub slug: String,
    pub project_key: Option<String>,
    pub is_private: bool,
    pub description: String,
    pub language: Language,
    pub fork_policy: ForkPolicy,
}

impl CreateRepositoryParams {
    /// Private, no description, no language, no forks
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            project_key: None,
            is_private: true,
            description: String::new(),
            language: Language::default(),
            fork_policy: ForkPolicy::default(),
        }
    }

    fn body(&self) -> CreateRepositoryBody<'_> {
        CreateRepositoryBody {
            scm: "git",
            is_private: self.is_private,
            description: &self.description,
            language: self.language.as_str(),
            fork_policy: self.fork_policy,
            project: self.project_key.as_deref().map(|key| ProjectKey { key }),
        }
    }
}

/// Parameters for updating a repository; `None` fields are left alone
#[derive(Debug, Clone, Default)]
pub struct UpdateRepositoryParams {
    pub slug: String,
    pub project_key: Option<String>,
    pub is_private: Option<bool>,
    pub description: Option<String>,
    pub language: Option<Language>,
    pub fork_policy: Option<ForkPolicy>,
}

impl UpdateRepositoryParams {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Default::default()
        }
    }

    fn body(&self) -> UpdateRepositoryBody<'_> {
        UpdateRepositoryBody {
            project: self.project_key.as_deref().map(|key| ProjectKey { key }),
            is_private: self.is_private,
            description: self.description.as_deref(),
            language: self.language.as_ref().map(Language::as_str),
            fork_policy: self.fork_policy,
        }
    }
}

#[derive(Serialize)]
struct ProjectKey<'a> {
    key: &'a str,
}

// Field order is the order keys are serialized in.
#[derive(Serialize)]
struct CreateRepositoryBody<'a> {
    scm: &'a str,
    is_private: bool,
    description: &'a str,
    language: &'a str,
    fork_policy: ForkPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectKey<'a>>,
}

#[derive(Serialize)]
struct UpdateRepositoryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectKey<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fork_policy: Option<ForkPolicy>,
}

impl UpdateRepositoryBody<'_> {
    fn is_empty(&self) -> bool {
        self.project.is_none()
            && self.is_private.is_none()
            && self.description.is_none()
            && self.language.is_none()
            && self.fork_policy.is_none()
    }
}

/// Usable as a single URL path segment; `.` and `..` would be resolved away
pub(crate) fn is_path_segment(value: &str) -> bool {
    SLUG_PATTERN.is_match(value) && !value.chars().all(|c| c == '.')
}

fn validate_slug(slug: &str) -> Result<()> {
    if is_path_segment(slug) {
        Ok(())
    } else {
        Err(BucketError::Validation(format!(
            "Invalid repository slug '{}'. Use letters, digits, '.', '-' or '_'.",
            slug
        )))
    }
}

fn encode_query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Repository operations handler
pub struct RepositoryHandler<'a, T: Transport> {
    client: &'a BitbucketClient<T>,
    team: String,
}

impl<'a, T: Transport> RepositoryHandler<'a, T> {
    /// Create a handler for `team`, or the session's selected team
    pub fn new(client: &'a BitbucketClient<T>, team: Option<&str>) -> Result<Self> {
        let team = client.session()?.resolve_team(team)?;
        validate_team(team)?;
        Ok(Self {
            client,
            team: team.to_string(),
        })
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    fn repo_path(&self, slug: &str) -> String {
        format!("repositories/{}/{}", self.team, slug)
    }

    fn target(&self, slug: &str) -> String {
        format!("{}/{}", self.team, slug)
    }

    /// List repositories
    ///
    /// A slug fetches just that repository; otherwise all repositories of
    /// the team, optionally filtered by project key on the server.
    pub async fn list(
        &self,
        slug: Option<&str>,
        project_key: Option<&str>,
    ) -> Result<Vec<Repository>> {
        if let Some(slug) = slug {
            return Ok(vec![self.get(slug).await?]);
        }

        let path = match project_key {
            Some(key) => format!(
                "repositories/{}?q=project.key=%22{}%22",
                self.team,
                encode_query_value(key)
            ),
            None => format!("repositories/{}", self.team),
        };

        self.client
            .invoke_as(&EndpointRequest::get(path).paginated())
            .await
    }

    /// Fetch a single repository
    pub async fn get(&self, slug: &str) -> Result<Repository> {
        validate_slug(slug)?;
        self.client
            .invoke_as(&EndpointRequest::get(self.repo_path(slug)))
            .await
    }

    /// Create a repository; `None` when the confirmation declined it
    pub async fn create(
        &self,
        params: &CreateRepositoryParams,
        confirm: &dyn ConfirmPolicy,
    ) -> Result<Option<Repository>> {
        validate_slug(&params.slug)?;
        let body = serde_json::to_value(params.body())?;

        let action = ConfirmAction::new(
            "Create repository",
            self.target(&params.slug),
            Impact::Medium,
        );
        if !confirm.confirm(&action)? {
            return Ok(None);
        }

        let created = self
            .client
            .invoke_as(&EndpointRequest::post(self.repo_path(&params.slug), body))
            .await?;
        Ok(Some(created))
    }

    /// Update the supplied fields of a repository
    ///
    /// Fails with [`BucketError::NoChangesSpecified`] before prompting or
    /// sending anything when no field was supplied.
    pub async fn update(
        &self,
        params: &UpdateRepositoryParams,
        confirm: &dyn ConfirmPolicy,
    ) -> Result<Option<Repository>> {
        validate_slug(&params.slug)?;
        let body = params.body();
        if body.is_empty() {
            return Err(BucketError::NoChangesSpecified);
        }
        let body = serde_json::to_value(body)?;

        let action = ConfirmAction::new(
            "Update repository",
            self.target(&params.slug),
            Impact::Medium,
        );
        if !confirm.confirm(&action)? {
            return Ok(None);
        }

        let updated = self
            .client
            .invoke_as(&EndpointRequest::put(self.repo_path(&params.slug), body))
            .await?;
        Ok(Some(updated))
    }

    /// Delete a repository; returns false when the confirmation declined it
    ///
    /// Forks are not deleted. `redirect_to` tells Bitbucket where to send
    /// visitors of the old URL.
    pub async fn delete(
        &self,
        slug: &str,
        redirect_to: Option<&str>,
        confirm: &dyn ConfirmPolicy,
    ) -> Result<bool> {
        validate_slug(slug)?;

        let mut path = self.repo_path(slug);
        if let Some(redirect) = redirect_to {
            path.push_str("?redirect_to=");
            path.push_str(&encode_query_value(redirect));
        }

        let action = ConfirmAction::new("Delete repository", self.target(slug), Impact::High);
        if !confirm.confirm(&action)? {
            return Ok(false);
        }

        let _: Value = self.client.invoke(&EndpointRequest::delete(path)).await?;
        Ok(true)
    }
}
