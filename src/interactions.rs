//! Lifecycle of the bot's own marker comments.
//!
//! The bot recognizes comments it previously posted by a fixed indicator
//! substring embedded in the body (typically an HTML comment, invisible when
//! rendered). Whether a marker comment should exist at all depends on the
//! pull request's current state, so every run re-derives the desired state
//! and reconciles the live comment list against it.

use futures::future::try_join_all;

use crate::github::{Comment, GithubClient, Issue};

/// The decision for a marker comment, computed from the existing comment
/// list. Side effects happen in [`MarkerComment::reconcile`]; this is pure.
#[derive(Debug, PartialEq, Eq)]
pub enum CommentAction {
    NoOp,
    /// Delete every comment carrying the indicator.
    DeleteAll(Vec<u64>),
    /// A marker comment already exists; reuse it.
    ReturnExisting(u64),
    CreateNew,
}

/// Decides what to do with the marker comment identified by `indicator`.
///
/// When several comments carry the indicator (normally there is at most one,
/// but nothing prevents duplicates), the first in input order wins and the
/// rest are ignored; they are all removed together once the comment is no
/// longer wanted.
pub fn decide(existing: &[Comment], indicator: &str, should_have: bool) -> CommentAction {
    let ours: Vec<u64> = existing
        .iter()
        .filter(|c| c.body.contains(indicator))
        .map(|c| c.id)
        .collect();

    if !should_have {
        return if ours.is_empty() {
            CommentAction::NoOp
        } else {
            CommentAction::DeleteAll(ours)
        };
    }

    match ours[..] {
        [] => CommentAction::CreateNew,
        [id] => CommentAction::ReturnExisting(id),
        [id, ..] => {
            tracing::warn!(
                "found {} comments with indicator {indicator:?}, keeping the first ({id})",
                ours.len()
            );
            CommentAction::ReturnExisting(id)
        }
    }
}

/// A marker comment on one issue or PR.
pub struct MarkerComment<'a> {
    issue: &'a Issue,
    indicator: &'a str,
    body: String,
}

impl<'a> MarkerComment<'a> {
    pub fn new<T>(issue: &'a Issue, indicator: &'a str, body: T) -> MarkerComment<'a>
    where
        T: Into<String>,
    {
        MarkerComment {
            issue,
            indicator,
            body: body.into(),
        }
    }

    /// Brings the live comment list in line with `should_have` and returns
    /// the id of the surviving comment, if any.
    ///
    /// Re-running with the same input reaches the same end state: a comment
    /// created by one run is found and returned by the next, never
    /// duplicated. Deletes of stale duplicates are issued concurrently; they
    /// are mutually independent.
    pub async fn reconcile(
        &self,
        client: &GithubClient,
        should_have: bool,
    ) -> anyhow::Result<Option<u64>> {
        let comments = self.issue.list_comments(client).await?;
        match decide(&comments, self.indicator, should_have) {
            CommentAction::NoOp => Ok(None),
            CommentAction::DeleteAll(ids) => {
                tracing::debug!(
                    "{}: deleting stale marker comments {ids:?}",
                    self.issue.global_id()
                );
                try_join_all(
                    ids.iter()
                        .map(|&id| self.issue.delete_comment(client, id)),
                )
                .await?;
                Ok(None)
            }
            CommentAction::ReturnExisting(id) => {
                tracing::debug!("{}: marker comment {id} already exists", self.issue.global_id());
                Ok(Some(id))
            }
            CommentAction::CreateNew => {
                let body = format!("{}{}", self.indicator, self.body);
                let comment = self.issue.post_comment(client, &body).await?;
                tracing::debug!(
                    "{}: created marker comment {}",
                    self.issue.global_id(),
                    comment.id
                );
                Ok(Some(comment.id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDICATOR: &str = "<!-- gardenbot: test-reminder -->";

    fn comment(id: u64, body: &str) -> Comment {
        Comment {
            id,
            node_id: format!("IC_{id}"),
            body: body.to_string(),
            html_url: format!("https://github.com/octocat/Hello-World/pull/1#issuecomment-{id}"),
            user: crate::github::User {
                login: "gardenbot".into(),
            },
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn creates_when_missing() {
        assert_eq!(decide(&[], INDICATOR, true), CommentAction::CreateNew);
    }

    #[test]
    fn returns_existing() {
        let existing = [comment(5, &format!("{INDICATOR}x"))];
        assert_eq!(
            decide(&existing, INDICATOR, true),
            CommentAction::ReturnExisting(5)
        );
    }

    #[test]
    fn deletes_when_no_longer_wanted() {
        let existing = [comment(5, &format!("{INDICATOR}x"))];
        assert_eq!(
            decide(&existing, INDICATOR, false),
            CommentAction::DeleteAll(vec![5])
        );
    }

    #[test]
    fn noop_when_absent_and_unwanted() {
        assert_eq!(decide(&[], INDICATOR, false), CommentAction::NoOp);
    }

    #[test]
    fn ignores_unrelated_comments() {
        let existing = [comment(1, "drive-by remark"), comment(2, "lgtm")];
        assert_eq!(decide(&existing, INDICATOR, true), CommentAction::CreateNew);
        assert_eq!(decide(&existing, INDICATOR, false), CommentAction::NoOp);
    }

    #[test]
    fn first_duplicate_wins() {
        let existing = [
            comment(1, "unrelated"),
            comment(7, &format!("{INDICATOR} one")),
            comment(9, &format!("{INDICATOR} two")),
        ];
        assert_eq!(
            decide(&existing, INDICATOR, true),
            CommentAction::ReturnExisting(7)
        );
        assert_eq!(
            decide(&existing, INDICATOR, false),
            CommentAction::DeleteAll(vec![7, 9])
        );
    }

    #[test]
    fn second_evaluation_is_idempotent() {
        // Whatever CreateNew produced is found on the next pass.
        assert_eq!(decide(&[], INDICATOR, true), CommentAction::CreateNew);
        let after_create = [comment(42, &format!("{INDICATOR}reminder text"))];
        assert_eq!(
            decide(&after_create, INDICATOR, true),
            CommentAction::ReturnExisting(42)
        );
    }
}
