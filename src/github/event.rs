use std::fmt;

use anyhow::Context;

use crate::github::{Issue, Label, User};

/// The name of a workflow-triggering webhook event, as reported by
/// `GITHUB_EVENT_NAME`.
#[derive(Debug)]
pub enum EventName {
    /// Issue activity.
    ///
    /// <https://docs.github.com/en/developers/webhooks-and-events/webhooks/webhook-events-and-payloads#issues>
    Issue,
    /// Pull request activity.
    ///
    /// Covers both the `pull_request` and `pull_request_target` triggers;
    /// their payloads are identical.
    ///
    /// <https://docs.github.com/en/developers/webhooks-and-events/webhooks/webhook-events-and-payloads#pull_request>
    PullRequest,
    /// All other unhandled events.
    Other,
}

impl std::str::FromStr for EventName {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<EventName, Self::Err> {
        Ok(match s {
            "issues" => EventName::Issue,
            "pull_request" | "pull_request_target" => EventName::PullRequest,
            _ => EventName::Other,
        })
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EventName::Issue => "issues",
                EventName::PullRequest => "pull_request",
                EventName::Other => "other",
            }
        )
    }
}

/// An event triggered by a webhook, decoded into its typed representation
/// once at the boundary.
#[derive(Debug)]
pub enum Event {
    /// Activity on an issue or PR.
    Issue(IssuesEvent),
}

impl Event {
    pub fn repo(&self) -> &Repository {
        match self {
            Event::Issue(event) => &event.repository,
        }
    }

    pub fn issue(&self) -> Option<&Issue> {
        match self {
            Event::Issue(event) => Some(&event.issue),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct IssuesEvent {
    #[serde(flatten)]
    pub action: IssuesAction,
    #[serde(alias = "pull_request")]
    pub issue: Issue,
    pub repository: Repository,
    /// The GitHub user that triggered the event.
    pub sender: User,
}

#[derive(PartialEq, Eq, Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum IssuesAction {
    Opened,
    Edited,
    Closed,
    Reopened,
    Labeled {
        /// The label added to the issue
        label: Label,
    },
    Synchronize,
    ReadyForReview,
    /// Any action this automation takes no interest in; kept so payloads for
    /// those actions still deserialize.
    #[serde(other)]
    Other,
}

#[derive(Debug, serde::Deserialize)]
pub struct Repository {
    pub full_name: String,
}

impl Repository {
    pub fn owner(&self) -> &str {
        self.full_name.split_once('/').map(|(o, _)| o).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.full_name.split_once('/').map(|(_, n)| n).unwrap_or("")
    }
}

/// Deserializes a webhook payload, reporting the JSON path that failed on
/// mismatch.
pub fn deserialize_payload<T: serde::de::DeserializeOwned>(v: &str) -> anyhow::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(v);
    let res: Result<T, _> = serde_path_to_error::deserialize(&mut deserializer);
    match res {
        Ok(r) => Ok(r),
        Err(e) => {
            let ctx = format!("at {:?}", e.path());
            Err(e.into_inner()).context(ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_json(extra: &str) -> String {
        format!(
            r####"{{
                "number": 101,
                "node_id": "I_abc123",
                "body": "### Severity\n\nOne\n\n### Available workarounds?\n\nYes\n",
                "title": "Something broke",
                "created_at": "2024-03-04T05:06:07Z",
                "updated_at": "2024-03-04T05:06:07Z",
                "html_url": "https://github.com/octocat/Hello-World/issues/101",
                "user": {{ "login": "octocat" }},
                "labels": [{{ "name": "bug" }}],
                "comments_url": "https://api.github.com/repos/octocat/Hello-World/issues/101/comments",
                "state": "open"
                {extra}
            }}"####
        )
    }

    #[test]
    fn issues_opened_payload() {
        let payload = format!(
            r#"{{
                "action": "opened",
                "issue": {issue},
                "repository": {{ "full_name": "octocat/Hello-World" }},
                "sender": {{ "login": "octocat" }}
            }}"#,
            issue = issue_json(""),
        );
        let event: IssuesEvent = deserialize_payload(&payload).unwrap();
        assert_eq!(event.action, IssuesAction::Opened);
        assert_eq!(event.issue.number, 101);
        assert!(!event.issue.is_pr());
        assert_eq!(event.issue.labels(), [Label::new("bug")]);
        assert_eq!(event.repository.owner(), "octocat");
        assert_eq!(event.repository.name(), "Hello-World");
    }

    #[test]
    fn pull_request_opened_payload() {
        // `pull_request` events carry the PR under a different key; the alias
        // folds them into the same shape.
        let payload = format!(
            r#"{{
                "action": "opened",
                "pull_request": {issue},
                "repository": {{ "full_name": "octocat/Hello-World" }},
                "sender": {{ "login": "octocat" }}
            }}"#,
            issue = issue_json(r#", "draft": true"#),
        );
        let event: IssuesEvent = deserialize_payload(&payload).unwrap();
        assert_eq!(event.action, IssuesAction::Opened);
        assert!(event.issue.draft);
    }

    #[test]
    fn labeled_payload_carries_label() {
        let payload = format!(
            r#"{{
                "action": "labeled",
                "label": {{ "name": "Epic" }},
                "issue": {issue},
                "repository": {{ "full_name": "octocat/Hello-World" }},
                "sender": {{ "login": "octocat" }}
            }}"#,
            issue = issue_json(""),
        );
        let event: IssuesEvent = deserialize_payload(&payload).unwrap();
        assert_eq!(
            event.action,
            IssuesAction::Labeled {
                label: Label::new("Epic")
            }
        );
    }

    #[test]
    fn unknown_action_still_deserializes() {
        let payload = format!(
            r#"{{
                "action": "milestoned",
                "issue": {issue},
                "repository": {{ "full_name": "octocat/Hello-World" }},
                "sender": {{ "login": "octocat" }}
            }}"#,
            issue = issue_json(""),
        );
        let event: IssuesEvent = deserialize_payload(&payload).unwrap();
        assert_eq!(event.action, IssuesAction::Other);
    }

    #[test]
    fn event_names_parse() {
        assert!(matches!("issues".parse(), Ok(EventName::Issue)));
        assert!(matches!("pull_request".parse(), Ok(EventName::PullRequest)));
        assert!(matches!(
            "pull_request_target".parse(),
            Ok(EventName::PullRequest)
        ));
        assert!(matches!("workflow_run".parse(), Ok(EventName::Other)));
    }
}
