//! Core functionality for bucket-rs
//!
//! This module contains shared business logic including:
//! - Login session state
//! - Session persistence (keyring or file)
//! - Interactive prompts behind traits
//! - Application configuration

pub mod config;
pub mod credentials;
pub mod prompt;
pub mod session;

pub use config::Config;
pub use credentials::{FileSessionStore, KeyringSessionStore, SessionStore};
pub use prompt::{ChoiceResolver, ConfirmAction, ConfirmPolicy, Impact};
pub use session::{AuthMaterial, AuthType, Session};
