//! Purpose: Label newly opened pull requests as in progress.

use crate::github::{Event, IssuesAction, Label};
use crate::handlers::Context;

const IN_PROGRESS_LABEL: &str = "In Progress";

pub(super) async fn handle(ctx: &Context, event: &Event) -> anyhow::Result<()> {
    let Event::Issue(event) = event;
    if event.action != IssuesAction::Opened || !event.issue.is_pr() {
        return Ok(());
    }
    // Draft PRs are not in progress from a review point of view yet.
    if event.issue.draft {
        return Ok(());
    }

    tracing::debug!("labeling pull request #{} as in progress", event.issue.number);
    event
        .issue
        .add_labels(&ctx.github, vec![Label::new(IN_PROGRESS_LABEL)])
        .await?;
    Ok(())
}
