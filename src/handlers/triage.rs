//! Purpose: When an issue is opened, derive labels from its issue-form
//! contents: a fixed triage marker, a priority from the severity/workaround
//! answers, and one label per impacted component.

use issue_form::{IssueForm, SeverityBlock};

use crate::github::{Event, IssuesAction, Label};
use crate::handlers::Context;

const TRIAGED_LABEL: &str = "Issue triaged";

pub(super) async fn handle(ctx: &Context, event: &Event) -> anyhow::Result<()> {
    let Event::Issue(event) = event;
    if event.action != IssuesAction::Opened || event.issue.is_pr() {
        return Ok(());
    }

    let form = IssueForm::parse(&event.issue.body);

    let mut labels = vec![Label::new(TRIAGED_LABEL)];
    labels.extend(priority_labels(&form));
    labels.extend(component_labels(&form));

    tracing::debug!(
        "adding labels to issue #{}: {:?}",
        event.issue.number,
        labels
    );
    event.issue.add_labels(&ctx.github, labels).await?;
    Ok(())
}

/// The priority of an issue, derived from how many users are impacted and
/// whether workarounds exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    fn label(self) -> Label {
        Label::new(match self {
            Priority::High => "🏔 High",
            Priority::Medium => "🏕 Medium",
            Priority::Low => "🏝 Low",
        })
    }
}

/// The priority matrix.
///
/// No workaround and an unusable platform is high priority unless only one
/// user is affected; a usable platform caps it at medium; any described
/// workaround is medium for broad impact and low otherwise. An unanswered
/// workaround question yields no priority at all.
pub(crate) fn classify(block: &SeverityBlock) -> Option<Priority> {
    let workaround = block.workaround.as_text()?;
    let severity = block.severity.as_text().unwrap_or("");

    Some(match workaround {
        "No and the platform is unusable" => {
            if severity == "One" {
                Priority::Medium
            } else {
                Priority::High
            }
        }
        "No but the platform is still usable" => Priority::Medium,
        _ => {
            if severity == "All" || severity == "Most (> 50%)" {
                Priority::Medium
            } else {
                Priority::Low
            }
        }
    })
}

/// One priority label per matched severity block, in input order.
///
/// Duplicates are possible when a body matches the template more than once;
/// they are kept as-is and the label-add call tolerates them.
fn priority_labels(form: &IssueForm) -> Vec<Label> {
    form.severity_blocks
        .iter()
        .filter_map(classify)
        .map(Priority::label)
        .collect()
}

fn component_labels(form: &IssueForm) -> Vec<Label> {
    if form.components.is_empty() {
        tracing::debug!("triage: no components found");
        return Vec::new();
    }
    form.components
        .iter()
        .map(|component| Label::new(format!("[Component] {component}")))
        .collect()
}
