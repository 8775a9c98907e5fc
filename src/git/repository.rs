use git2::Repository;
use std::path::{Path, PathBuf};

use crate::auth::{Action, Authorizer};
use crate::error::{AppError, Result};
use crate::models::{CommitSummary, OrgInfo, RepoInfo};

const REPO_SUFFIX: &str = ".git";

/// On-disk layout of hosted repositories: `<root>/<org>/<repo>.git`.
///
/// Holds no open handles; every caller opens its own `Repository`, so nothing
/// here is shared between requests or threads.
#[derive(Debug, Clone)]
pub struct RepoStore {
    root: PathBuf,
}

impl RepoStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_path(&self, org: &str, repo: &str) -> Result<PathBuf> {
        if !is_plain_name(org) || !is_plain_name(repo) {
            return Err(AppError::RepoNotFound(format!("{}/{}", org, repo)));
        }
        Ok(self.root.join(org).join(format!("{}{}", repo, REPO_SUFFIX)))
    }

    pub fn open(&self, org: &str, repo: &str) -> Result<Repository> {
        let path = self.repo_path(org, repo)?;
        Repository::open(&path).map_err(|_| AppError::RepoNotFound(format!("{}/{}", org, repo)))
    }

    /// Organizations visible to `subject`, each with its repositories.
    ///
    /// Hidden directories, ignored organizations and organizations without a
    /// read grant are left out entirely.
    pub fn list_orgs(
        &self,
        subject: &str,
        ignore: &[String],
        authorizer: &dyn Authorizer,
    ) -> Result<Vec<OrgInfo>> {
        let mut orgs = Vec::new();

        for dir in read_dir_sorted(&self.root)? {
            let Some(name) = visible_dir_name(&dir) else {
                continue;
            };
            if ignore.iter().any(|i| *i == name) {
                continue;
            }
            if !authorizer.enforce(subject, &name, Action::Read) {
                continue;
            }

            let mut repos = Vec::new();
            for sub in read_dir_sorted(&dir)? {
                let Some(dir_name) = visible_dir_name(&sub) else {
                    continue;
                };
                let Some(repo_name) = dir_name.strip_suffix(REPO_SUFFIX) else {
                    continue;
                };
                match Repository::open(&sub) {
                    Ok(repo) => repos.push(RepoInfo {
                        name: repo_name.to_string(),
                        default_branch: default_branch(&repo),
                    }),
                    Err(e) => tracing::warn!("skipping unreadable repository {}: {}", sub.display(), e),
                }
            }

            orgs.push(OrgInfo { name, repos });
        }

        Ok(orgs)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = std::fs::read_dir(dir)
        .map_err(|e| AppError::Internal(format!("failed to read {}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

fn visible_dir_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with('.') || !path.is_dir() {
        return None;
    }
    Some(name.to_string())
}

/// Short name of the branch HEAD points at. A new repository has no refs.
fn default_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    head.shorthand().map(|s| s.to_string())
}

pub fn commit_to_summary(commit: &git2::Commit) -> CommitSummary {
    let author = commit.author();
    let timestamp = author.when().seconds();
    CommitSummary {
        oid: commit.id().to_string(),
        author_name: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        message: commit.message().unwrap_or("").trim().to_string(),
        timestamp,
        relative_time: format_relative_time(timestamp),
    }
}

pub fn format_relative_time(timestamp: i64) -> String {
    format_relative_time_at(timestamp, chrono::Utc::now().timestamp())
}

pub fn format_relative_time_at(timestamp: i64, now: i64) -> String {
    let diff = now - timestamp;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 2592000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if diff < 31536000 {
        let months = diff / 2592000;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = diff / 31536000;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}
