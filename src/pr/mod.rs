pub mod types;

pub use types::{Comment, PrUrl, PullRequestBundle};

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "pr-narrator";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("GitHub API request failed ({}): {message}", status_label(*status))]
    Upstream {
        /// HTTP status from GitHub, when the request got that far
        status: Option<u16>,
        message: String,
    },
}

fn status_label(status: Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_string(),
    }
}

impl PrError {
    fn upstream(err: reqwest::Error) -> Self {
        PrError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Parse a GitHub PR URL into its component parts.
///
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}
pub fn parse_pr_url(url: &str) -> Result<PrUrl, PrError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    if parsed.host_str() != Some("github.com") {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(|| PrError::InvalidUrl(url.to_string()))?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let pr_number = segments[3]
        .parse::<u64>()
        .map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    Ok(PrUrl {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        pr_number,
    })
}

/// Source of pull-request data. Object-safe so the pipeline can be
/// exercised with a stub provider in tests.
#[async_trait]
pub trait PrProvider: Send + Sync {
    async fn fetch(&self, pr: &PrUrl) -> Result<PullRequestBundle, PrError>;
}

/// GitHub REST client. One instance per process; the inner reqwest client
/// pools connections and is safe to share across concurrent requests.
pub struct GithubClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

#[derive(Deserialize)]
struct User {
    login: String,
}

#[derive(Deserialize)]
struct PullResponse {
    title: String,
    body: Option<String>,
}

#[derive(Deserialize)]
struct CommentResponse {
    user: User,
    body: String,
}

impl GithubClient {
    pub fn new(token: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token,
            base_url: GITHUB_API_URL.to_string(),
        })
    }

    fn pulls_url(&self, pr: &PrUrl) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.base_url, pr.owner, pr.repo, pr.pr_number
        )
    }

    /// Fetch PR title and description. This is the one required read.
    async fn fetch_metadata(&self, pr: &PrUrl) -> Result<PullResponse, PrError> {
        let response = self
            .client
            .get(self.pulls_url(pr))
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(PrError::upstream)?
            .error_for_status()
            .map_err(PrError::upstream)?;

        response.json::<PullResponse>().await.map_err(PrError::upstream)
    }

    /// Fetch review comments. Best-effort.
    async fn fetch_comments(&self, pr: &PrUrl) -> Result<Vec<Comment>, PrError> {
        let response = self
            .client
            .get(format!("{}/comments", self.pulls_url(pr)))
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(PrError::upstream)?
            .error_for_status()
            .map_err(PrError::upstream)?;

        let comments = response
            .json::<Vec<CommentResponse>>()
            .await
            .map_err(PrError::upstream)?;

        Ok(comments
            .into_iter()
            .map(|c| Comment {
                author: c.user.login,
                body: c.body,
            })
            .collect())
    }

    /// Fetch the unified diff via GitHub's media-type negotiation. Best-effort.
    async fn fetch_diff(&self, pr: &PrUrl) -> Result<String, PrError> {
        self.client
            .get(self.pulls_url(pr))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.diff")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(PrError::upstream)?
            .error_for_status()
            .map_err(PrError::upstream)?
            .text()
            .await
            .map_err(PrError::upstream)
    }

    /// List the newest open PR of a repository. Used by `--check` to verify
    /// GitHub connectivity without touching the paid providers.
    pub async fn latest_pull(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<(u64, String)>, PrError> {
        #[derive(Deserialize)]
        struct PullListEntry {
            number: u64,
            title: String,
        }

        let url = format!("{}/repos/{}/{}/pulls?per_page=1", self.base_url, owner, repo);
        let pulls = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(PrError::upstream)?
            .error_for_status()
            .map_err(PrError::upstream)?
            .json::<Vec<PullListEntry>>()
            .await
            .map_err(PrError::upstream)?;

        Ok(pulls.into_iter().next().map(|p| (p.number, p.title)))
    }
}

#[async_trait]
impl PrProvider for GithubClient {
    /// Assemble a [`PullRequestBundle`] from three logically independent
    /// reads, issued concurrently. Metadata is required; comments and diff
    /// degrade to empty values on failure since a summary is still useful
    /// without them.
    #[instrument(skip(self), fields(owner = %pr.owner, repo = %pr.repo, pr = pr.pr_number))]
    async fn fetch(&self, pr: &PrUrl) -> Result<PullRequestBundle, PrError> {
        let (metadata, comments, diff) = tokio::join!(
            self.fetch_metadata(pr),
            self.fetch_comments(pr),
            self.fetch_diff(pr),
        );

        let metadata = metadata?;
        debug!(title = %metadata.title, "received PR metadata");

        let comments = comments.unwrap_or_else(|err| {
            warn!(error = %err, "comments fetch failed, continuing without discussion");
            Vec::new()
        });
        let diff = diff.unwrap_or_else(|err| {
            warn!(error = %err, "diff fetch failed, continuing without diff");
            String::new()
        });
        debug!(comments = comments.len(), diff_bytes = diff.len(), "assembled PR bundle");

        Ok(PullRequestBundle {
            title: metadata.title,
            description: metadata.body.unwrap_or_default(),
            comments,
            diff,
        })
    }
}
