//! The GitHub Actions runner surface: the event that triggered this run,
//! step outputs, and workflow commands.
//!
//! Workflow commands are magic `::command::` lines on stdout that the runner
//! interprets; see
//! <https://docs.github.com/en/actions/using-workflows/workflow-commands-for-github-actions>.

use std::io::Write;

use anyhow::Context;

use crate::github::EventName;

/// The webhook event this workflow run was triggered by.
pub struct WorkflowEvent {
    pub name: EventName,
    /// The raw JSON payload, as written by the runner to `GITHUB_EVENT_PATH`.
    pub payload: String,
}

pub fn workflow_event() -> anyhow::Result<WorkflowEvent> {
    let raw_name =
        std::env::var("GITHUB_EVENT_NAME").context("GITHUB_EVENT_NAME is not set")?;
    let path = std::env::var("GITHUB_EVENT_PATH").context("GITHUB_EVENT_PATH is not set")?;
    let payload = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read event payload at {path}"))?;
    let Ok(name) = raw_name.parse::<EventName>();
    Ok(WorkflowEvent { name, payload })
}

/// Publishes a step output, so later workflow steps can read
/// `steps.<id>.outputs.<name>`.
pub fn set_output(name: &str, value: &str) -> anyhow::Result<()> {
    let Some(path) = std::env::var_os("GITHUB_OUTPUT") else {
        // Not running under the Actions runner (e.g. a local invocation).
        tracing::warn!("GITHUB_OUTPUT is not set, discarding output {name}={value}");
        return Ok(());
    };
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.to_string_lossy()))?;
    writeln!(file, "{}", format_output(name, value)).context("failed to write step output")?;
    Ok(())
}

/// Emits a debug line, visible in runs with step debug logging enabled.
pub fn debug(message: &str) {
    println!("::debug::{}", escape_data(message));
}

/// Emits an error annotation and marks the run as failed. The caller is
/// responsible for the non-zero exit.
pub fn fail(message: &str) {
    println!("::error::{}", escape_data(message));
}

fn format_output(name: &str, value: &str) -> String {
    format!("{name}={value}")
}

/// Escapes a workflow-command payload per the runner's rules.
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_command_payloads() {
        assert_eq!(escape_data("plain"), "plain");
        assert_eq!(escape_data("50% done\r\nnext"), "50%25 done%0D%0Anext");
    }

    #[test]
    fn output_line_format() {
        assert_eq!(format_output("comment-id", "12345"), "comment-id=12345");
    }
}
