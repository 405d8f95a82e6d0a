use anyhow::Context as _;

pub mod actions;
pub mod changed_files;
pub mod config;
pub mod github;
pub mod handlers;
pub mod interactions;
pub mod issue_types;
pub mod logger;
pub mod test_reminder;

use github::{Event, EventName, IssuesEvent, PullRequestDetails, deserialize_payload};

/// Decodes the triggering webhook payload and runs the event handlers.
///
/// Returns `false` when the event is one this automation takes no interest
/// in.
pub async fn process_event(
    ctx: &handlers::Context,
    event: EventName,
    payload: &str,
) -> anyhow::Result<bool> {
    let event = match event {
        EventName::Issue => {
            let payload = deserialize_payload::<IssuesEvent>(payload)
                .context("IssuesEvent failed to deserialize")?;

            tracing::info!("handling issue event on #{}", payload.issue.number);

            Event::Issue(payload)
        }
        EventName::PullRequest => {
            let mut payload = deserialize_payload::<IssuesEvent>(payload)
                .context("PullRequest event failed to deserialize")?;

            tracing::info!("handling pull request event on #{}", payload.issue.number);

            // The `pull_request` payload key does not mark the inner object
            // as a PR; do it here so handlers can rely on `is_pr`.
            payload.issue.pull_request = Some(PullRequestDetails::new());

            Event::Issue(payload)
        }
        EventName::Other => {
            tracing::debug!("ignoring unhandled event");
            return Ok(false);
        }
    };

    handlers::handle(ctx, &event).await?;
    Ok(true)
}
