//! Typed access to the configuration the workflow environment provides.
//!
//! Everything here is read once at startup; a missing required value is a
//! fatal, descriptive error that `main` turns into a failed run annotation.

use std::fmt;

use secrecy::SecretString;

/// Returns the GitHub token for API calls.
///
/// The Actions runner passes the `github_token` action input as
/// `INPUT_GITHUB_TOKEN`; `GITHUB_TOKEN` is accepted as a fallback for runs
/// outside an action (e.g. a plain workflow step or local invocation).
pub fn github_token() -> Result<SecretString, ConfigurationError> {
    std::env::var("INPUT_GITHUB_TOKEN")
        .or_else(|_| std::env::var("GITHUB_TOKEN"))
        .map(Into::into)
        .map_err(|_| ConfigurationError::Missing("github_token"))
}

/// The `owner/name` repository this run operates on, from `GITHUB_REPOSITORY`.
pub fn repository() -> Result<String, ConfigurationError> {
    require("GITHUB_REPOSITORY")
}

/// Configuration for the `check-test-reminder` subcommand.
pub struct TestReminderConfig {
    /// Substring identifying the reminder comments this automation owns.
    pub indicator: String,
    /// The project whose changes require a manual test run.
    pub tracked_project: String,
    /// Whitespace-separated project list computed by an earlier build step.
    ///
    /// When absent, the touched projects are derived from the PR's changed
    /// files instead.
    pub touched_projects: Option<Vec<String>>,
}

impl TestReminderConfig {
    pub fn from_env() -> Result<TestReminderConfig, ConfigurationError> {
        Ok(TestReminderConfig {
            indicator: require("TEST_COMMENT_INDICATOR")?,
            tracked_project: require("TRACKED_PROJECT")?,
            touched_projects: optional("TOUCHED_PROJECTS")
                .map(|raw| raw.split_whitespace().map(str::to_string).collect()),
        })
    }
}

/// Configuration for the `update-test-reminder` subcommand.
pub struct UpdateReminderConfig {
    pub indicator: String,
    /// Id of the comment created earlier in the workflow.
    pub comment_id: u64,
    /// The branch the build was produced from.
    pub branch: String,
}

impl UpdateReminderConfig {
    pub fn from_env() -> Result<UpdateReminderConfig, ConfigurationError> {
        let raw_id = require("COMMENT_ID")?;
        let comment_id = raw_id
            .parse()
            .map_err(|_| ConfigurationError::Invalid("COMMENT_ID", raw_id))?;
        Ok(UpdateReminderConfig {
            indicator: require("TEST_COMMENT_INDICATOR")?,
            comment_id,
            branch: require("BRANCH_NAME")?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigurationError> {
    optional(name).ok_or(ConfigurationError::Missing(name))
}

fn optional(name: &'static str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigurationError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl std::error::Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigurationError::Missing(name) => {
                write!(f, "Required configuration `{name}` is not set")
            }
            ConfigurationError::Invalid(name, value) => {
                write!(f, "Configuration `{name}` has an invalid value `{value}`")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing() {
        let err = ConfigurationError::Missing("COMMENT_ID");
        assert_eq!(err.to_string(), "Required configuration `COMMENT_ID` is not set");
    }

    #[test]
    fn display_invalid() {
        let err = ConfigurationError::Invalid("COMMENT_ID", "abc".into());
        assert_eq!(
            err.to_string(),
            "Configuration `COMMENT_ID` has an invalid value `abc`"
        );
    }
}
