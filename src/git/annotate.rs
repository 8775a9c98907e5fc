//! Last-commit annotation for directory listings.
//!
//! Every child of a listed directory gets the most recent commit touching it.
//! Each child is one history walk from the origin commit, stopping at the first
//! commit whose diff against its first parent touches the child's path (the
//! path itself, or anything below it). The walk order is fixed (topological,
//! then time), so results are reproducible. It is not an exact blame: across
//! merges the first match under this order can differ from what a full blame
//! would report.
//!
//! Walks run as blocking tasks, at most `concurrency` at a time, each with its
//! own repository handle. The whole pass is bounded by a timeout; when it
//! fires, in-flight walks are cancelled and the request fails. A walk that
//! errors only loses its own annotation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use git2::{DiffOptions, Oid, Repository, Sort};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::AnnotateConfig;
use crate::error::{AppError, Result};
use crate::git::repository::commit_to_summary;
use crate::models::{CommitSummary, Entry, EntryKind};

pub const README: &str = "README.md";

#[derive(Debug, Clone)]
pub struct Annotator {
    concurrency: usize,
    timeout: Duration,
}

#[derive(Debug)]
pub struct Annotated {
    pub entries: Vec<Entry>,
    /// A file or symlink named exactly `README.md` is among the entries.
    pub has_readme: bool,
}

type WalkResult = (usize, String, Result<Option<CommitSummary>>);

impl Annotator {
    pub fn new(config: &AnnotateConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            timeout: config.timeout(),
        }
    }

    pub async fn annotate(&self, repo_path: &Path, origin: Oid, entries: Vec<Entry>) -> Result<Annotated> {
        self.annotate_until(repo_path, origin, entries, CancellationToken::new())
            .await
    }

    /// Walks observe `cancel`, which is cancelled on every way out of here,
    /// including the future being dropped mid-flight.
    async fn annotate_until(
        &self,
        repo_path: &Path,
        origin: Oid,
        mut entries: Vec<Entry>,
        cancel: CancellationToken,
    ) -> Result<Annotated> {
        let _guard = cancel.clone().drop_guard();
        let has_readme = entries.iter().any(is_readme);
        let start = Instant::now();

        let results = match tokio::time::timeout(
            self.timeout,
            self.run_walks(repo_path, origin, &entries, &cancel),
        )
        .await
        {
            Ok(results) => results?,
            Err(_) => {
                cancel.cancel();
                tracing::warn!(
                    "annotation of {} timed out after {:?}",
                    repo_path.display(),
                    self.timeout
                );
                return Err(AppError::AnnotationTimeout(self.timeout));
            }
        };

        for (index, path, result) in results {
            match result {
                Ok(commit) => entries[index].last_commit = commit,
                Err(e) => tracing::warn!("no last commit for {}: {}", path, e),
            }
        }

        tracing::debug!(
            "annotated {} entries of {} in {:?}",
            entries.len(),
            repo_path.display(),
            start.elapsed()
        );

        Ok(Annotated { entries, has_readme })
    }

    async fn run_walks(
        &self,
        repo_path: &Path,
        origin: Oid,
        entries: &[Entry],
        cancel: &CancellationToken,
    ) -> Result<Vec<WalkResult>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, entry) in entries.iter().enumerate() {
            if entry.is_parent() {
                continue;
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            let repo_path: PathBuf = repo_path.to_path_buf();
            let path = entry.path.clone();
            let cancel = cancel.clone();

            tasks.spawn_blocking(move || {
                let _permit = permit;
                let result = Repository::open(&repo_path)
                    .and_then(|repo| last_commit_touching(&repo, origin, &path, &cancel))
                    .map_err(|source| AppError::Traversal {
                        path: path.clone(),
                        source,
                    });
                (index, path, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::warn!("annotation task failed: {}", e),
            }
        }
        Ok(results)
    }
}

/// Regular files and symlinks named exactly `README.md`.
fn is_readme(entry: &Entry) -> bool {
    matches!(entry.kind, EntryKind::File | EntryKind::Symlink) && entry.name == README
}

/// First commit reachable from `origin` that touches `path`.
///
/// Returns `Ok(None)` when history runs out without a match, or when the walk
/// is cancelled.
pub fn last_commit_touching(
    repo: &Repository,
    origin: Oid,
    path: &str,
    cancel: &CancellationToken,
) -> std::result::Result<Option<CommitSummary>, git2::Error> {
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(origin)?;

    for oid in revwalk {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let commit = repo.find_commit(oid?)?;
        if commit_touches_path(repo, &commit, path)? {
            return Ok(Some(commit_to_summary(&commit)));
        }
    }

    Ok(None)
}

fn commit_touches_path(repo: &Repository, commit: &git2::Commit, path: &str) -> std::result::Result<bool, git2::Error> {
    let tree = commit.tree()?;

    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut opts = DiffOptions::new();
    opts.pathspec(path);
    opts.disable_pathspec_match(true);

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    Ok(diff.deltas().len() > 0)
}
