#![allow(unused)]

//! # contract: seams to the external services the pipeline talks to
//!
//! The analysis core never speaks HTTP itself. It calls three narrow traits:
//!
//! - [`CompletionClient`]: turns a prompt into a piece of prose (file summaries).
//! - [`RepositoryHost`]: resolves an `(owner, repo)` pair into metadata, a flat
//!   file listing, and per-file content.
//! - [`SandboxPublisher`]: publishes a generated application and returns a
//!   shareable preview. Unrelated to the analysis pipeline.
//!
//! ## Mocking & Testing
//! - All traits are annotated for `mockall`; the generated `Mock*` types are
//!   exported under the default `test-export-mocks` feature so integration
//!   tests can drive the pipeline without network access.
//!
//! ## Errors
//! - Implementors convert every transport/service failure into a boxed error;
//!   callers decide whether that failure is fatal or recorded.

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use serde::{Deserialize, Serialize};

/// Error type shared by all collaborator traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identifies a repository on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

/// Repository-level metadata placed at the head of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub name: String,
    pub description: Option<String>,
    /// Live demo / homepage link, falling back to the repository page.
    pub demo_link: Option<String>,
}

/// One file in a remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Repository-relative, `/`-separated path.
    pub path: String,
    /// Content address used to fetch the file body (git blob sha).
    pub sha: String,
    /// Size in bytes when the listing reports it.
    pub size: Option<u64>,
}

/// Result of publishing an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewLink {
    pub sandbox_id: String,
    pub preview_url: String,
    pub editor_url: String,
}

/// A text-generation service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Ask the service to answer `prompt`; returns the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, BoxError>;
}

/// A source-hosting service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Fetch name, description and link for the repository.
    async fn metadata(&self, repo: &RepoRef) -> Result<RepoMetadata, BoxError>;

    /// List every file (blob) of the default branch, recursively.
    async fn list_files(&self, repo: &RepoRef) -> Result<Vec<RemoteEntry>, BoxError>;

    /// Fetch the raw bytes of one listed file.
    async fn fetch_content(&self, repo: &RepoRef, entry: &RemoteEntry) -> Result<Vec<u8>, BoxError>;
}

/// A sandbox service that hosts a generated application.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SandboxPublisher: Send + Sync {
    /// Publish `code` as the application's main component.
    async fn publish(&self, code: &str) -> Result<PreviewLink, BoxError>;
}
