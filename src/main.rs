use clap::Parser;
use gardenbot::github::GithubClient;
use gardenbot::handlers::Context;
use gardenbot::{actions, config, issue_types, logger, test_reminder};

/// Repository gardening automation, run once per triggering workflow step.
#[derive(Parser)]
#[command(name = "gardenbot")]
enum Command {
    /// Process the webhook event that triggered this workflow run.
    Event,
    /// Ensure the test reminder comment matches the PR's touched projects.
    CheckTestReminder,
    /// Rewrite the test reminder comment with branch testing instructions.
    UpdateTestReminder,
    /// Assign org-level issue types to open issues based on their labels.
    AssignIssueTypes,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    logger::init();

    let command = Command::parse();
    if let Err(e) = run(command).await {
        actions::fail(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let ctx = Context {
        github: GithubClient::new_from_env()?,
    };

    match command {
        Command::Event => {
            let event = actions::workflow_event()?;
            tracing::debug!("received event = '{}'", event.name);
            let handled = gardenbot::process_event(&ctx, event.name, &event.payload).await?;
            if !handled {
                tracing::debug!("done, nothing to handle");
            }
        }
        Command::CheckTestReminder => test_reminder::check(&ctx).await?,
        Command::UpdateTestReminder => test_reminder::update(&ctx).await?,
        Command::AssignIssueTypes => {
            let repository = config::repository()?;
            issue_types::assign(&ctx, &repository).await?;
        }
    }
    Ok(())
}
