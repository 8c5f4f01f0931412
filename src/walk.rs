//! Recursive enumeration of the regular files under a root directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Directory names skipped when no ignore set is configured.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &["node_modules"];

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("root {path} is not a readable directory: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to read {path}: {source}")]
    Entry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated.
    pub relative: String,
    /// Size in bytes at walk time.
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct TreeWalker {
    ignore_dirs: BTreeSet<String>,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()))
    }
}

impl TreeWalker {
    pub fn new<I>(ignore_dirs: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            ignore_dirs: ignore_dirs.into_iter().collect(),
        }
    }

    /// True when `name` is a directory name that must never be descended into.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore_dirs.contains(name)
    }

    /// True when any directory segment of a `/`-separated path is ignored.
    pub fn is_ignored_path(&self, relative: &str) -> bool {
        let mut segments: Vec<&str> = relative.split('/').collect();
        segments.pop();
        segments.iter().any(|s| self.is_ignored(s))
    }

    /// Walk `root` and return every regular file below it.
    ///
    /// Entries of each directory are visited in file-name order so the result
    /// is stable across runs. Symlinks are not followed. Any unreadable
    /// directory below the root aborts the whole walk.
    pub fn walk(&self, root: &Path) -> Result<Vec<WalkedFile>, WalkError> {
        let meta = std::fs::metadata(root).map_err(|source| {
            error!(error = ?source, path = %root.display(), "Walk root is not readable");
            WalkError::Root {
                path: root.to_path_buf(),
                source,
            }
        })?;
        if !meta.is_dir() {
            error!(path = %root.display(), "Walk root is not a directory");
            return Err(WalkError::NotADirectory(root.to_path_buf()));
        }

        let mut results = Vec::new();
        self.visit_dir(root, root, &mut results)?;
        info!(root = %root.display(), count = results.len(), "Completed walking source tree");
        Ok(results)
    }

    fn visit_dir(
        &self,
        dir: &Path,
        root: &Path,
        results: &mut Vec<WalkedFile>,
    ) -> Result<(), WalkError> {
        let read_err = |source| WalkError::Entry {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = std::fs::read_dir(dir)
            .map_err(read_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| WalkError::Entry {
                path: path.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                if self.is_ignored(&name) {
                    debug!(path = %path.display(), "Skipping ignored directory");
                    continue;
                }
                self.visit_dir(&path, root, results)?;
            } else if file_type.is_file() {
                let relative = relative_path(&path, root);
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                results.push(WalkedFile {
                    path,
                    relative,
                    size,
                });
            } else {
                debug!(path = %path.display(), "Skipping non-regular entry");
            }
        }
        Ok(())
    }
}

fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
