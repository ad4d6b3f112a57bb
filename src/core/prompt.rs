//! Interactive decisions behind traits
//!
//! Team selection and mutating repository operations need a human answer
//! in the CLI. Operations only see [`ChoiceResolver`] and [`ConfirmPolicy`],
//! so tests and scripted runs can supply answers without a terminal.

use dialoguer::{Confirm, Input, Select};

use crate::error::Result;

/// Picks one option out of several
#[cfg_attr(test, mockall::automock)]
pub trait ChoiceResolver {
    /// Return the index of the chosen option
    fn choose(&self, prompt: &str, options: &[String]) -> Result<usize>;
}

/// Terminal selection list
pub struct InteractiveChoice;

impl ChoiceResolver for InteractiveChoice {
    fn choose(&self, prompt: &str, options: &[String]) -> Result<usize> {
        let index = Select::new()
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact()?;
        Ok(index)
    }
}

/// How much damage a mutation can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// Reversible changes (create, update)
    Medium,
    /// Irreversible changes (delete)
    High,
}

/// A pending mutation awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmAction {
    /// What will happen, e.g. "Delete repository"
    pub description: String,
    /// What it happens to, e.g. "acme/website"
    pub target: String,
    pub impact: Impact,
}

impl ConfirmAction {
    pub fn new(description: impl Into<String>, target: impl Into<String>, impact: Impact) -> Self {
        Self {
            description: description.into(),
            target: target.into(),
            impact,
        }
    }
}

/// Decides whether a mutation proceeds
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmPolicy {
    /// Return true to proceed, false to skip
    fn confirm(&self, action: &ConfirmAction) -> Result<bool>;
}

/// Ask on the terminal
///
/// Medium impact is a yes/no question defaulting to no. High impact
/// requires typing the last path segment of the target.
pub struct InteractiveConfirm;

impl ConfirmPolicy for InteractiveConfirm {
    fn confirm(&self, action: &ConfirmAction) -> Result<bool> {
        match action.impact {
            Impact::Medium => {
                let answer = Confirm::new()
                    .with_prompt(format!("{} '{}'?", action.description, action.target))
                    .default(false)
                    .interact()?;
                Ok(answer)
            }
            Impact::High => {
                let expected = action
                    .target
                    .rsplit('/')
                    .next()
                    .unwrap_or(action.target.as_str());
                println!(
                    "{} '{}'. This cannot be undone.",
                    action.description, action.target
                );
                let typed: String = Input::new()
                    .with_prompt(format!("Type '{}' to confirm", expected))
                    .allow_empty(true)
                    .interact_text()?;
                Ok(typed.trim() == expected)
            }
        }
    }
}

/// Proceed without asking (`--yes`)
pub struct AssumeYes;

impl ConfirmPolicy for AssumeYes {
    fn confirm(&self, _action: &ConfirmAction) -> Result<bool> {
        Ok(true)
    }
}

/// Report what would happen and skip (`--dry-run`)
pub struct DryRun;

impl ConfirmPolicy for DryRun {
    fn confirm(&self, action: &ConfirmAction) -> Result<bool> {
        println!("What if: {} '{}'", action.description, action.target);
        Ok(false)
    }
}

/// Pick the policy matching the mutating command flags
pub fn policy_for(yes: bool, dry_run: bool) -> Box<dyn ConfirmPolicy> {
    if dry_run {
        Box::new(DryRun)
    } else if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(InteractiveConfirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete_action() -> ConfirmAction {
        ConfirmAction::new("Delete repository", "acme/website", Impact::High)
    }

    #[test]
    fn test_assume_yes_proceeds() {
        assert!(AssumeYes.confirm(&delete_action()).unwrap());
    }

    #[test]
    fn test_dry_run_never_proceeds() {
        assert!(!DryRun.confirm(&delete_action()).unwrap());
    }

    #[test]
    fn test_dry_run_wins_over_yes() {
        let policy = policy_for(true, true);
        assert!(!policy.confirm(&delete_action()).unwrap());

        let policy = policy_for(true, false);
        assert!(policy.confirm(&delete_action()).unwrap());
    }
}
