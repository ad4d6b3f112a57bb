//! CLI module for bucket-rs
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod auth;
pub mod commands;
pub mod config;
pub mod repo;
pub mod team;

pub use commands::{Cli, Commands};
