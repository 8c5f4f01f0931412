//! GitHub REST client: repository metadata, recursive tree listing, raw blobs.

use crate::config::RemoteConfig;
use crate::contract::{BoxError, RemoteEntry, RepoMetadata, RepoRef, RepositoryHost};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

const USER_AGENT: &str = concat!("source-atlas/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RepoResponse {
    name: String,
    description: Option<String>,
    homepage: Option<String>,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    size: Option<u64>,
}

impl GitHubClient {
    pub fn new(
        api_base: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BoxError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, BoxError> {
        info!(
            api_base = %config.api_base,
            token_set = config.token.is_some(),
            timeout_secs = config.timeout_secs,
            "Initialized repository host client"
        );
        Self::new(
            config.api_base.clone(),
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Recursive tree of `HEAD`, which the host resolves to the default branch.
    pub fn tree_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/HEAD?recursive=1",
            self.api_base, repo.owner, repo.repo
        )
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let req = self
            .client
            .get(url)
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn repo(&self, repo: &RepoRef) -> Result<RepoResponse, BoxError> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.repo);
        let resp = self
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            error!(status = %status, url = %url, "Repository lookup failed");
            return Err(format!("GET {url} returned {status}").into());
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn metadata(&self, repo: &RepoRef) -> Result<RepoMetadata, BoxError> {
        let info = self.repo(repo).await?;
        let demo_link = info
            .homepage
            .filter(|h| !h.trim().is_empty())
            .or(info.html_url);
        Ok(RepoMetadata {
            name: info.name,
            description: info.description,
            demo_link,
        })
    }

    async fn list_files(&self, repo: &RepoRef) -> Result<Vec<RemoteEntry>, BoxError> {
        let url = self.tree_url(repo);
        info!(url = %url, "Fetching repository tree");
        let resp = self
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            error!(status = %status, url = %url, "Repository tree listing failed");
            return Err(format!("GET {url} returned {status}").into());
        }

        let tree: TreeResponse = resp.json().await?;
        if tree.truncated {
            warn!(owner = %repo.owner, repo = %repo.repo, "Tree listing truncated by host, some files are missing");
        }
        let entries: Vec<RemoteEntry> = tree
            .tree
            .into_iter()
            .filter(|e| e.kind == "blob")
            .map(|e| RemoteEntry {
                path: e.path,
                sha: e.sha,
                size: e.size,
            })
            .collect();
        info!(count = entries.len(), "Repository tree listed");
        Ok(entries)
    }

    async fn fetch_content(&self, repo: &RepoRef, entry: &RemoteEntry) -> Result<Vec<u8>, BoxError> {
        let url = format!(
            "{}/repos/{}/{}/git/blobs/{}",
            self.api_base, repo.owner, repo.repo, entry.sha
        );
        let resp = self
            .get(&url)
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            error!(status = %status, path = %entry.path, "Blob fetch failed");
            return Err(format!("GET {url} returned {status}").into());
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
