//! Reconciles org-level issue types with the repository's type labels.
//!
//! Organizations can declare first-class issue types (Task, Bug, ...), but
//! most issues predate them and only carry the equivalent label. This batch
//! pass walks every open issue per type label and assigns the matching issue
//! type. There is no per-item recovery: a failed update aborts the rest of
//! the run, and the next scheduled run picks up where this one gave up.

use std::collections::HashMap;

use anyhow::Context as _;
use serde_json::json;

use crate::github::{GithubClient, Issue, IssueRepository};
use crate::handlers::Context;

/// Labels that currently map to an org issue type.
const TYPE_LABELS: &[(&str, &str)] = &[
    ("[Type] Task", "Task"),
    ("[Type] Bug", "Bug"),
    ("[Type] Enhancement", "Enhancement"),
    ("Epic", "Epic"),
];

pub async fn assign(ctx: &Context, repository: &str) -> anyhow::Result<()> {
    let repository = IssueRepository::from_full_name(repository)?;

    let types = list_org_issue_types(&ctx.github, &repository.organization).await?;
    let lookup = type_lookup(&types);
    tracing::info!("organization issue types: {lookup:?}");

    for (label, type_name) in TYPE_LABELS {
        let Some(type_id) = lookup.get(type_name.to_lowercase().as_str()) else {
            tracing::debug!("no org issue type matches label {label:?}, skipping");
            continue;
        };

        let issues = repository.issues_with_label(&ctx.github, label).await?;
        for issue in assignable_issues(&issues) {
            set_issue_type(&ctx.github, &issue.node_id, type_id)
                .await
                .with_context(|| format!("failed to set issue type on {}", issue.global_id()))?;
            tracing::info!(
                "issue {} ({label}) now has issue type {type_name}",
                issue.global_id()
            );
        }
    }
    Ok(())
}

/// The issues eligible for a type assignment: pull requests share the issue
/// numbering and label query results, but cannot carry an issue type.
fn assignable_issues(issues: &[Issue]) -> impl Iterator<Item = &Issue> {
    issues.iter().filter(|issue| !issue.is_pr())
}

#[derive(Debug, serde::Deserialize)]
struct IssueType {
    id: String,
    name: String,
}

/// Case-insensitive name → id lookup.
fn type_lookup(types: &[IssueType]) -> HashMap<String, &str> {
    types
        .iter()
        .map(|t| (t.name.to_lowercase(), t.id.as_str()))
        .collect()
}

async fn list_org_issue_types(
    client: &GithubClient,
    org: &str,
) -> anyhow::Result<Vec<IssueType>> {
    let mut response = client
        .graphql_query(
            "query($org:String!) {
                organization(login: $org) {
                    issueTypes(first: 100) {
                        nodes {
                            id
                            name
                        }
                    }
                }
            }",
            json!({ "org": org }),
        )
        .await?;
    let nodes = response["data"]["organization"]["issueTypes"]["nodes"].take();
    if nodes.is_null() {
        // Organization without issue types enabled.
        return Ok(Vec::new());
    }
    serde_json::from_value(nodes).context("unexpected issueTypes response shape")
}

async fn set_issue_type(
    client: &GithubClient,
    issue_node_id: &str,
    issue_type_id: &str,
) -> anyhow::Result<()> {
    client
        .graphql_query(
            "mutation($issueId: ID!, $typeId: ID!) {
                updateIssue(input: {issueId: $issueId, issueTypeId: $typeId}) {
                    issue {
                        id
                    }
                }
            }",
            json!({
                "issueId": issue_node_id,
                "typeId": issue_type_id,
            }),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::github::deserialize_payload;

    use super::*;

    fn issue(number: u64, pull_request: bool) -> Issue {
        let pr_field = if pull_request {
            r#""pull_request": { "url": "https://api.github.com/repos/octocat/Hello-World/pulls/1" },"#
        } else {
            ""
        };
        let raw = format!(
            r#"{{
                "number": {number},
                "node_id": "I_{number}",
                "body": "",
                "title": "item {number}",
                "created_at": "2024-03-04T05:06:07Z",
                "updated_at": "2024-03-04T05:06:07Z",
                "html_url": "https://github.com/octocat/Hello-World/issues/{number}",
                "user": {{ "login": "octocat" }},
                "labels": [{{ "name": "[Type] Bug" }}],
                {pr_field}
                "comments_url": "https://api.github.com/repos/octocat/Hello-World/issues/{number}/comments",
                "state": "open"
            }}"#
        );
        deserialize_payload(&raw).unwrap()
    }

    #[test]
    fn pull_requests_are_skipped() {
        let issues = vec![issue(1, false), issue(2, true), issue(3, false), issue(4, true)];
        let numbers: Vec<u64> = assignable_issues(&issues).map(|i| i.number).collect();
        assert_eq!(numbers, [1, 3]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let types = vec![
            IssueType {
                id: "IT_1".into(),
                name: "Bug".into(),
            },
            IssueType {
                id: "IT_2".into(),
                name: "EPIC".into(),
            },
        ];
        let lookup = type_lookup(&types);
        assert_eq!(lookup.get("bug").copied(), Some("IT_1"));
        assert_eq!(lookup.get("epic").copied(), Some("IT_2"));
        assert_eq!(lookup.get("task"), None);
    }

    #[test]
    fn every_type_label_has_a_type_name() {
        for (label, type_name) in TYPE_LABELS {
            assert!(!label.is_empty());
            assert!(!type_name.is_empty());
        }
    }
}
