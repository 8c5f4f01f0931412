//! Orchestration: walk (or list) → classify → parse → summarize → record.
//!
//! This module drives one analysis run and assembles its [`Aggregate`]. Each
//! file moves through the same stages:
//!
//!   - classified from its extension (always succeeds)
//!   - `Media`/`Unsupported` files are recorded as skipped; their content is
//!     never read and no parser or summary is involved
//!   - the content is loaded and handed to the category's parser on a
//!     blocking worker; a parse failure is recorded and summarization skipped
//!   - parsed files are summarized through the shared rate limiter; a failed
//!     summary becomes fallback text, never a failed record
//!
//! # Failure isolation
//! Nothing that goes wrong with one file (unreadable, malformed, fetch error,
//! even a panicking parser) stops the others: it is logged and embedded in
//! that file's [`FileRecord`]. Only a failed traversal, or a failure to write
//! the artifact, aborts a run ([`PipelineError`]).
//!
//! # Ordering
//! Files are processed up to `concurrency` at a time, but records are
//! collected with an order-preserving buffer, so the output lists files in
//! traversal order regardless of which finished first.

use crate::classify::{classify, ContentCategory};
use crate::config::Config;
use crate::contract::{RemoteEntry, RepoMetadata, RepoRef, RepositoryHost};
use crate::graph::{ArrayRef, ObjectRef, Value};
use crate::parse::{dispatch, skip_reason, ParseError, ParseOptions, ParseOutcome, Representation};
use crate::serialize;
use crate::summarize::{Summarizer, Summary};
use crate::walk::{TreeWalker, WalkError};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why one file has no structural representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to read file: {0}")]
    Read(String),
    #[error("failed to fetch file: {0}")]
    Fetch(String),
    #[error("processing task failed: {0}")]
    Worker(String),
}

/// Run-level failures. Any of these means no artifact is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("traversal failed: {0}")]
    Traversal(#[from] WalkError),
    #[error("failed to serialize aggregate: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub enum FileOutcome {
    Parsed(Representation),
    Failed(FileError),
    Skipped { reason: String },
}

/// Everything recorded about one file. Built once, never changed.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: String,
    pub category: ContentCategory,
    pub outcome: FileOutcome,
    pub summary: Option<Summary>,
    pub source_size: u64,
    pub source_code: Option<String>,
}

impl FileRecord {
    fn skipped(path: String, category: ContentCategory, source_size: u64) -> Self {
        Self {
            path,
            category,
            outcome: FileOutcome::Skipped {
                reason: skip_reason(category).to_string(),
            },
            summary: None,
            source_size,
            source_code: None,
        }
    }

    fn failed(path: String, category: ContentCategory, error: FileError, source_size: u64) -> Self {
        Self {
            path,
            category,
            outcome: FileOutcome::Failed(error),
            summary: None,
            source_size,
            source_code: None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped { .. })
    }

    pub fn error(&self) -> Option<&FileError> {
        match &self.outcome {
            FileOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn representation(&self) -> Option<&Representation> {
        match &self.outcome {
            FileOutcome::Parsed(r) => Some(r),
            _ => None,
        }
    }

    pub fn to_graph(&self) -> Value {
        let record = ObjectRef::new()
            .with("file", self.path.as_str())
            .with("type", self.category.as_str());
        match &self.outcome {
            FileOutcome::Parsed(rep) => record.insert(rep.output_key(), rep.to_graph()),
            FileOutcome::Failed(e) => record.insert("error", e.to_string()),
            FileOutcome::Skipped { reason } => {
                record.insert("skipped", true);
                record.insert("reason", reason.as_str());
            }
        }
        if let Some(summary) = &self.summary {
            record.insert("summary", summary.text());
        }
        record.insert("sourceSize", self.source_size);
        if let Some(code) = &self.source_code {
            record.insert("sourceCode", code.as_str());
        }
        Value::Object(record)
    }
}

/// Result of one run: optional repository metadata plus one record per file,
/// in traversal order.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub metadata: Option<RepoMetadata>,
    pub files: Vec<FileRecord>,
}

impl Aggregate {
    pub fn to_graph(&self) -> Value {
        let metadata = match &self.metadata {
            Some(m) => Value::Object(
                ObjectRef::new()
                    .with("name", m.name.as_str())
                    .with("description", m.description.clone())
                    .with("demoLink", m.demo_link.clone()),
            ),
            None => Value::Null,
        };
        let files = ArrayRef::new();
        for record in &self.files {
            files.push(record.to_graph());
        }
        Value::Object(ObjectRef::new().with("metadata", metadata).with("files", files))
    }

    /// Cycle-safe JSON text of the whole aggregate.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serialize::to_string(&self.to_graph())
    }

    pub fn record(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|r| r.path == path)
    }
}

pub struct Pipeline {
    walker: TreeWalker,
    parse_options: ParseOptions,
    summarizer: Option<Arc<Summarizer>>,
    concurrency: usize,
    include_source: bool,
}

impl Pipeline {
    pub fn new(config: &Config, summarizer: Option<Summarizer>) -> Self {
        Self {
            walker: TreeWalker::new(config.walk.ignore_dirs.iter().cloned()),
            parse_options: ParseOptions {
                schema: config.schema,
            },
            summarizer: summarizer.map(Arc::new),
            concurrency: config.pipeline.concurrency.max(1),
            include_source: config.pipeline.include_source,
        }
    }

    /// Analyze every file below `root`.
    pub async fn analyze_directory(&self, root: &Path) -> Result<Aggregate, PipelineError> {
        info!(root = %root.display(), "[ANALYZE] Walking local source tree");
        let files = self.walker.walk(root)?;

        let records: Vec<FileRecord> = stream::iter(files.into_iter().map(|file| {
            let disk_path = file.path;
            self.record_file(file.relative, file.size, move || async move {
                tokio::fs::read(&disk_path).await.map_err(|e| {
                    error!(error = ?e, path = %disk_path.display(), "Failed to read file");
                    FileError::Read(e.to_string())
                })
            })
        }))
        .buffered(self.concurrency)
        .collect()
        .await;

        info!(files = records.len(), "[ANALYZE] Local analysis complete");
        Ok(Aggregate {
            metadata: None,
            files: records,
        })
    }

    /// Analyze a hosted repository. A failed metadata lookup yields no
    /// metadata and a failed listing yields no files; both are logged and
    /// the run carries on with what it has.
    pub async fn analyze_remote<H>(&self, host: &H, repo: &RepoRef) -> Aggregate
    where
        H: RepositoryHost + ?Sized,
    {
        info!(owner = %repo.owner, repo = %repo.repo, "[ANALYZE] Analyzing remote repository");

        let metadata = match host.metadata(repo).await {
            Ok(m) => Some(m),
            Err(e) => {
                error!(error = %e, owner = %repo.owner, repo = %repo.repo, "[ANALYZE][ERROR] Metadata fetch failed");
                None
            }
        };

        let entries: Vec<RemoteEntry> = match host.list_files(repo).await {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| {
                    let ignored = self.walker.is_ignored_path(&e.path);
                    if ignored {
                        debug!(path = %e.path, "Skipping file under ignored directory");
                    }
                    !ignored
                })
                .collect(),
            Err(e) => {
                error!(error = %e, owner = %repo.owner, repo = %repo.repo, "[ANALYZE][ERROR] File listing failed");
                Vec::new()
            }
        };

        let records: Vec<FileRecord> = stream::iter(entries.into_iter().map(|entry| {
            let path = entry.path.clone();
            let size = entry.size.unwrap_or(0);
            self.record_file(path, size, move || async move {
                host.fetch_content(repo, &entry).await.map_err(|e| {
                    error!(error = %e, path = %entry.path, "Failed to fetch file content");
                    FileError::Fetch(e.to_string())
                })
            })
        }))
        .buffered(self.concurrency)
        .collect()
        .await;

        info!(files = records.len(), "[ANALYZE] Remote analysis complete");
        Aggregate { metadata, files: records }
    }

    /// Take one file from classification to its finished record. `load` is
    /// only invoked for categories that have a parser.
    pub async fn record_file<F, Fut>(&self, path: String, size_hint: u64, load: F) -> FileRecord
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, FileError>>,
    {
        let category = classify(&path);
        debug!(path = %path, %category, "Classified file");

        if !category.is_parsed() {
            info!(path = %path, %category, "Skipping file without parser");
            return FileRecord::skipped(path, category, size_hint);
        }

        let bytes = match load().await {
            Ok(bytes) => bytes,
            Err(e) => return FileRecord::failed(path, category, e, size_hint),
        };
        let source_size = bytes.len() as u64;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let options = self.parse_options;
        let worker_path = path.clone();
        let parsed = tokio::task::spawn_blocking(move || {
            let outcome = dispatch(category, &worker_path, &text, &options);
            (outcome, text)
        })
        .await;

        let (outcome, text) = match parsed {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, path = %path, "[ANALYZE][ERROR] Parser task failed");
                return FileRecord::failed(path, category, FileError::Worker(e.to_string()), source_size);
            }
        };
        let source_code = self.include_source.then(|| text.clone());

        let representation = match outcome {
            Ok(ParseOutcome::Parsed(rep)) => rep,
            Ok(ParseOutcome::Skipped { reason }) => {
                return FileRecord {
                    path,
                    category,
                    outcome: FileOutcome::Skipped { reason },
                    summary: None,
                    source_size,
                    source_code: None,
                };
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Parse failed, recording error");
                return FileRecord {
                    path,
                    category,
                    outcome: FileOutcome::Failed(FileError::Parse(e)),
                    summary: None,
                    source_size,
                    source_code,
                };
            }
        };

        let summary = match &self.summarizer {
            Some(summarizer) => Some(summarizer.summarize(&path, &text).await),
            None => None,
        };

        info!(path = %path, %category, summarized = summary.is_some(), "Recorded file");
        FileRecord {
            path,
            category,
            outcome: FileOutcome::Parsed(representation),
            summary,
            source_size,
            source_code,
        }
    }
}

/// File name for a remote run's artifact.
pub fn remote_artifact_name(repo: &RepoRef) -> String {
    format!("{}.json", repo.repo).replace(['/', '\\', ':'], "_")
}

/// Serialize `aggregate` and write it to `dir/file_name` atomically.
pub fn write_artifact(
    aggregate: &Aggregate,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, PipelineError> {
    let text = aggregate.to_json_string()?;
    let dest = dir.join(file_name);
    let write_err = |source| PipelineError::Write {
        path: dest.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.persist(&dest).map_err(|e| write_err(e.error))?;

    info!(path = %dest.display(), bytes = text.len(), "Artifact written");
    Ok(dest)
}
