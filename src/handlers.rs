use crate::github::{Event, GithubClient};

mod in_progress;
mod triage;

pub struct Context {
    pub github: GithubClient,
}

/// Runs every event handler against `event`.
///
/// A failing handler does not prevent the others from running, but any
/// failure fails the run once all of them had their chance.
pub async fn handle(ctx: &Context, event: &Event) -> anyhow::Result<()> {
    let mut failed = false;

    if let Err(e) = triage::handle(ctx, event).await {
        tracing::error!("failed to process event with triage handler: {e:?}");
        failed = true;
    }

    if let Err(e) = in_progress::handle(ctx, event).await {
        tracing::error!("failed to process event with in_progress handler: {e:?}");
        failed = true;
    }

    if failed {
        anyhow::bail!("one or more handlers failed, errors logged above");
    }
    Ok(())
}
