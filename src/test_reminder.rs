//! The test reminder comment on pull requests.
//!
//! A PR that touches the tracked project needs a manual test run before it
//! can ship. During the build, `check` makes sure exactly one reminder
//! comment exists on such PRs (and that none is left behind on PRs that no
//! longer touch the project), then publishes the comment id as a step
//! output. Once the build has produced an installable artifact, `update`
//! rewrites the comment with concrete testing instructions.

use anyhow::Context as _;

use crate::actions;
use crate::changed_files::{self, ChangedFiles};
use crate::config::{TestReminderConfig, UpdateReminderConfig};
use crate::github::{
    EventName, IssueRepository, IssuesEvent, PullRequestDetails, deserialize_payload,
};
use crate::handlers::Context;
use crate::interactions::MarkerComment;

/// Reconciles the reminder comment with the PR's touched projects and
/// publishes the surviving comment id (`0` when there is none) as the
/// `comment-id` step output.
pub async fn check(ctx: &Context) -> anyhow::Result<()> {
    let config = TestReminderConfig::from_env()?;

    let workflow_event = actions::workflow_event()?;
    anyhow::ensure!(
        matches!(workflow_event.name, EventName::PullRequest),
        "check-test-reminder must run from a pull_request workflow, got `{}`",
        workflow_event.name,
    );
    let mut event: IssuesEvent = deserialize_payload(&workflow_event.payload)
        .context("pull_request event failed to deserialize")?;
    event.issue.pull_request = Some(PullRequestDetails::new());

    let touches_tracked_project = match &config.touched_projects {
        Some(projects) => projects.iter().any(|p| p == &config.tracked_project),
        None => {
            // No list was handed down from an earlier build step, derive it
            // from the PR's changed files.
            let mut changed = ChangedFiles::new();
            let files = changed.list(&ctx.github, &event.issue).await?;
            changed_files::touched_projects(files)
                .iter()
                .any(|p| *p == config.tracked_project)
        }
    };
    tracing::debug!(
        "pull request #{} touches {}: {touches_tracked_project}",
        event.issue.number,
        config.tracked_project,
    );

    let reminder = MarkerComment::new(
        &event.issue,
        &config.indicator,
        "Thank you for your contribution. Since these changes touch a tracked \
         project, the pull request will need a manual test run. This comment \
         will be updated with testing instructions as soon as the build is \
         complete.",
    );
    let comment_id = reminder
        .reconcile(&ctx.github, touches_tracked_project)
        .await?;

    actions::set_output("comment-id", &comment_id.unwrap_or(0).to_string())?;
    Ok(())
}

/// Overwrites the reminder comment with branch-specific testing
/// instructions.
///
/// The comment id comes from the `check` step earlier in the workflow; no
/// existence check is performed here, an invalid id surfaces as the API
/// failure it is.
pub async fn update(ctx: &Context) -> anyhow::Result<()> {
    let config = UpdateReminderConfig::from_env()?;
    let repository = IssueRepository::from_full_name(&crate::config::repository()?)?;

    tracing::debug!(
        "updating test reminder comment {} with instructions for branch {}",
        config.comment_id,
        config.branch,
    );

    let body = format!(
        "{indicator}\nThe build is complete and ready for testing. On your \
         test environment, run `bin/checkout-build {branch}` to get started.",
        indicator = config.indicator,
        branch = config.branch,
    );
    repository
        .edit_comment(&ctx.github, config.comment_id, &body)
        .await?;
    Ok(())
}
