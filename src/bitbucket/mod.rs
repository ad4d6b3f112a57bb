//! Bitbucket Cloud API integration module
//!
//! This module provides all Bitbucket-related functionality:
//! - Request invoker with pagination
//! - Basic and OAuth2 login
//! - Current user lookup
//! - Team listing and selection
//! - Repository operations

pub mod auth;
pub mod client;
pub mod repository;
pub mod team;
pub mod user;

pub use auth::{AtlassianCredential, BasicCredential, OAuthConsumer};
pub use client::{BitbucketClient, EndpointRequest, Endpoints, HttpTransport, Method, Transport};
pub use repository::{
    CreateRepositoryParams, ForkPolicy, Language, Repository, RepositoryHandler,
    UpdateRepositoryParams,
};
pub use team::{Team, TeamHandler, TeamRole};
pub use user::User;
