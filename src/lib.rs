//! bucket-rs - A command-line client for Bitbucket Cloud
//!
//! This library provides login (basic and OAuth2), team selection and
//! repository management (list, create, update, delete) on top of the
//! Bitbucket REST API, plus the CLI that drives them.

pub mod bitbucket;
pub mod cli;
pub mod core;
pub mod error;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{BucketError, Result};
