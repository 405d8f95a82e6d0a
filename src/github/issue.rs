use std::fmt;
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Utc;

use crate::github::GithubClient;

/// An issue or pull request.
///
/// Since issues and pull requests share most of their fields, this struct is
/// used for both. The `pull_request` field can be used to determine which it
/// is. Note that some webhook events do not set that field, in which case it
/// must be populated manually at the event boundary.
#[derive(Debug, serde::Deserialize)]
pub struct Issue {
    pub number: u64,
    /// The GraphQL node id, needed for GraphQL mutations against this issue.
    #[serde(default)]
    pub node_id: String,
    #[serde(deserialize_with = "opt_string")]
    pub body: String,
    pub title: String,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    /// The common URL for viewing this issue or PR.
    ///
    /// Example: `https://github.com/octocat/Hello-World/pull/1347`
    pub html_url: String,
    pub user: User,
    pub labels: Vec<Label>,
    /// Indicator if this is a pull request.
    ///
    /// This is `Some` if this is a PR (as opposed to an issue).
    pub pull_request: Option<PullRequestDetails>,
    #[serde(default)]
    pub draft: bool,
    /// The API URL for discussion comments.
    ///
    /// Example: `https://api.github.com/repos/octocat/Hello-World/issues/1347/comments`
    pub comments_url: String,
    /// The repository for this issue.
    ///
    /// Note that this is constructed via the [`Issue::repository`] method.
    /// It is not deserialized from the GitHub API.
    #[serde(skip)]
    pub repository: OnceLock<IssueRepository>,
    /// Whether it is open or closed.
    pub state: IssueState,
}

#[derive(PartialEq, Eq, Debug, Clone, Ord, PartialOrd, serde::Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Label {
        Label { name: name.into() }
    }
}

#[derive(Debug, serde::Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Clone, serde::Deserialize, Eq, PartialEq)]
pub struct User {
    pub login: String,
}

/// An indicator used to differentiate between an issue and a pull request.
///
/// Some webhook events include a `pull_request` field in the Issue object,
/// and some don't. GitHub does include a few fields here, but they aren't
/// needed at this time.
#[derive(Debug, Default, serde::Deserialize)]
pub struct PullRequestDetails {}

impl PullRequestDetails {
    pub fn new() -> PullRequestDetails {
        PullRequestDetails {}
    }
}

/// The owning organization and repository of an issue, derived from its API
/// URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueRepository {
    pub organization: String,
    pub repository: String,
}

impl fmt::Display for IssueRepository {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.repository)
    }
}

impl IssueRepository {
    /// Parses an `owner/name` pair, as found in `GITHUB_REPOSITORY`.
    pub fn from_full_name(full_name: &str) -> anyhow::Result<IssueRepository> {
        let (organization, repository) = full_name
            .split_once('/')
            .with_context(|| format!("`{full_name}` is not an owner/name repository"))?;
        Ok(IssueRepository {
            organization: organization.into(),
            repository: repository.into(),
        })
    }

    pub(crate) fn url(&self, client: &GithubClient) -> String {
        format!(
            "{}/repos/{}/{}",
            client.api_url, self.organization, self.repository
        )
    }

    pub async fn edit_comment(
        &self,
        client: &GithubClient,
        id: u64,
        new_body: &str,
    ) -> anyhow::Result<Comment> {
        let comment_url = format!("{}/issues/comments/{}", self.url(client), id);
        #[derive(serde::Serialize)]
        struct NewComment<'a> {
            body: &'a str,
        }
        let comment = client
            .json(
                client
                    .patch(&comment_url)
                    .json(&NewComment { body: new_body }),
            )
            .await
            .context("failed to edit comment")?;
        Ok(comment)
    }

    pub async fn delete_comment(&self, client: &GithubClient, id: u64) -> anyhow::Result<()> {
        let comment_url = format!("{}/issues/comments/{}", self.url(client), id);
        client
            .send_req(client.delete(&comment_url))
            .await
            .with_context(|| format!("failed to delete comment {id}"))?;
        Ok(())
    }

    /// Lists the open issues (and pull requests) carrying `label`, fully
    /// paginated.
    pub async fn issues_with_label(
        &self,
        client: &GithubClient,
        label: &str,
    ) -> anyhow::Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut page = 1;
        loop {
            let mut url = url::Url::parse(&format!("{}/issues", self.url(client)))?;
            url.query_pairs_mut()
                .append_pair("labels", label)
                .append_pair("state", "open")
                .append_pair("per_page", "100")
                .append_pair("page", &page.to_string());

            let new: Vec<Issue> = client.json(client.get(url.as_str())).await?;
            if new.is_empty() {
                break;
            }
            issues.extend(new);

            page += 1;
        }
        Ok(issues)
    }
}

impl Issue {
    pub fn repository(&self) -> &IssueRepository {
        self.repository.get_or_init(|| {
            // https://api.github.com/repos/octocat/Hello-World/issues/1347/comments
            tracing::trace!("get repository for {}", self.comments_url);
            let url = url::Url::parse(&self.comments_url).unwrap();
            let mut segments = url.path_segments().unwrap();
            let _comments = segments.next_back().unwrap();
            let _number = segments.next_back().unwrap();
            let _issues_or_prs = segments.next_back().unwrap();
            let repository = segments.next_back().unwrap();
            let organization = segments.next_back().unwrap();
            IssueRepository {
                organization: organization.into(),
                repository: repository.into(),
            }
        })
    }

    pub fn global_id(&self) -> String {
        format!("{}#{}", self.repository(), self.number)
    }

    pub fn is_pr(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub async fn add_labels(
        &self,
        client: &GithubClient,
        labels: Vec<Label>,
    ) -> anyhow::Result<()> {
        tracing::info!("add_labels: {} +{:?}", self.global_id(), labels);
        // POST /repos/:owner/:repo/issues/:number/labels
        let url = format!(
            "{repo_url}/issues/{number}/labels",
            repo_url = self.repository().url(client),
            number = self.number
        );

        // Don't try to add labels already present on this issue.
        let labels = labels
            .into_iter()
            .filter(|l| !self.labels().contains(l))
            .map(|l| l.name)
            .collect::<Vec<_>>();

        if labels.is_empty() {
            return Ok(());
        }

        #[derive(serde::Serialize)]
        struct LabelsReq {
            labels: Vec<String>,
        }

        client
            .send_req(client.post(&url).json(&LabelsReq { labels }))
            .await
            .context("failed to add labels")?;

        Ok(())
    }
}

// Comments

#[derive(Debug, serde::Deserialize)]
pub struct Comment {
    pub id: u64,
    pub node_id: String,
    #[serde(deserialize_with = "opt_string")]
    pub body: String,
    pub html_url: String,
    pub user: User,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<Utc>>,
}

impl Issue {
    /// Lists every discussion comment on this issue or PR, fully paginated.
    pub async fn list_comments(&self, client: &GithubClient) -> anyhow::Result<Vec<Comment>> {
        let mut comments = Vec::new();
        let mut page = 1;
        loop {
            let comment_url = format!(
                "{}/issues/{}/comments?page={page}&per_page=100",
                self.repository().url(client),
                self.number,
            );

            let new: Vec<Comment> = client.json(client.get(&comment_url)).await?;
            if new.is_empty() {
                break;
            }
            comments.extend(new);

            page += 1;
        }
        Ok(comments)
    }

    pub async fn post_comment(&self, client: &GithubClient, body: &str) -> anyhow::Result<Comment> {
        #[derive(serde::Serialize)]
        struct PostComment<'a> {
            body: &'a str,
        }
        let comments_url = format!(
            "{}/issues/{}/comments",
            self.repository().url(client),
            self.number,
        );
        let comment = client
            .json(client.post(&comments_url).json(&PostComment { body }))
            .await
            .context("failed to post comment")?;
        Ok(comment)
    }

    pub async fn edit_comment(
        &self,
        client: &GithubClient,
        id: u64,
        new_body: &str,
    ) -> anyhow::Result<Comment> {
        self.repository().edit_comment(client, id, new_body).await
    }

    pub async fn delete_comment(&self, client: &GithubClient, id: u64) -> anyhow::Result<()> {
        self.repository().delete_comment(client, id).await
    }
}

// Pull-request files

#[derive(Debug, serde::Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    /// Set when the file was renamed in this PR; the old path still counts as
    /// touched.
    #[serde(default)]
    pub previous_filename: Option<String>,
}

impl Issue {
    /// Returns the files changed by this pull request, fully paginated (no
    /// files are returned if this `Issue` is not a pull request).
    pub async fn files(&self, client: &GithubClient) -> anyhow::Result<Vec<PullRequestFile>> {
        if !self.is_pr() {
            return Ok(vec![]);
        }

        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let req = client.get(&format!(
                "{}/pulls/{}/files?page={page}&per_page=100",
                self.repository().url(client),
                self.number
            ));

            let new: Vec<PullRequestFile> = client.json(req).await?;
            if new.is_empty() {
                break;
            }
            files.extend(new);

            page += 1;
        }
        Ok(files)
    }
}

/// Deserialize as an optional string
pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    use serde::de::Deserialize;
    match <Option<String>>::deserialize(deserializer) {
        Ok(v) => Ok(v.unwrap_or_default()),
        Err(e) => Err(e),
    }
}
