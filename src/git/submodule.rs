//! Submodule cross-links.
//!
//! A submodule entry is a gitlink: a pinned commit in some other repository.
//! Its content is never read. Instead the remote URL from `.gitmodules` is
//! mapped back onto this site, so the entry links to `/<org>/<repo>/tree/<pin>`
//! when the other repository is hosted here too.

use std::path::Path;

use git2::{Repository, Tree};

use crate::error::Result;

const GITMODULES: &str = ".gitmodules";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Submodule {
    name: String,
    path: Option<String>,
    url: Option<String>,
}

/// Parsed `.gitmodules` of one tree.
#[derive(Debug, Clone, Default)]
pub struct SubmoduleConfig {
    modules: Vec<Submodule>,
}

impl SubmoduleConfig {
    /// Read `.gitmodules` from the root of `tree`, if it has one.
    pub fn from_tree(repo: &Repository, tree: &Tree) -> Result<Option<Self>> {
        let Some(entry) = tree.get_name(GITMODULES) else {
            return Ok(None);
        };
        let Ok(blob) = repo.find_blob(entry.id()) else {
            return Ok(None);
        };
        Ok(Some(Self::parse(&String::from_utf8_lossy(blob.content()))))
    }

    pub fn parse(text: &str) -> Self {
        let mut modules = Vec::new();
        let mut current: Option<Submodule> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                modules.extend(current.take());
                current = section_name(line).map(|name| Submodule {
                    name,
                    ..Default::default()
                });
                continue;
            }

            let (Some(module), Some((key, value))) = (current.as_mut(), line.split_once('=')) else {
                continue;
            };
            let value = unquote(value.trim()).to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "path" => module.path = Some(value),
                "url" => module.url = Some(value),
                _ => {}
            }
        }
        modules.extend(current);

        Self { modules }
    }

    /// Remote URL of the submodule checked out at `path`, falling back to a
    /// section named `name`.
    pub fn url_for(&self, path: &str, name: &str) -> Option<&str> {
        self.modules
            .iter()
            .find(|m| m.path.as_deref() == Some(path))
            .or_else(|| self.modules.iter().find(|m| m.name == name))
            .and_then(|m| m.url.as_deref())
    }
}

/// `[submodule "name"]` → `name`. Other sections are ignored.
fn section_name(line: &str) -> Option<String> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    let rest = inner.strip_prefix("submodule")?.trim();
    Some(unquote(rest).to_string())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Site link for a submodule pinned at `pinned`, hosted under `repos_root`.
pub fn cross_link(url: &str, pinned: &str, repos_root: &Path) -> String {
    let path = repository_path(url);
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let site_path = if path.starts_with('/') {
        let root = repos_root.to_string_lossy();
        let root = root.trim_end_matches('/');
        match path.strip_prefix(root) {
            Some(rest) if !root.is_empty() && rest.starts_with('/') => rest.to_string(),
            _ => path.to_string(),
        }
    } else {
        format!("/{}", path)
    };

    format!("{}/tree/{}", site_path, pinned)
}

/// The repository path following the host specifier of a remote URL.
///
/// - `scheme://host/path` → `/path`
/// - `user@host:path` → `path`
/// - anything else is taken as a local path
fn repository_path(url: &str) -> &str {
    if let Some((_, rest)) = url.split_once("://") {
        return rest.find('/').map(|i| &rest[i..]).unwrap_or("");
    }
    match url.split_once(':') {
        Some((host, path)) if !host.contains('/') => path,
        _ => url,
    }
}
