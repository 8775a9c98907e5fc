//! Tree browsing DTOs.
//!
//! - `Entry`: one child of a listed directory, with its last touching commit
//! - `CommitSummary`: the annotation payload attached to an entry
//! - `BreadcrumbItem`: one navigable path segment
//! - `Listing`: a full `tree` view (entries + navigation context)
//! - `BlobView`: the rendered (non-raw) `blob` view

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
    Submodule,
}

impl EntryKind {
    /// Directories and submodules are listed before files and symlinks.
    pub fn is_folder(self) -> bool {
        matches!(self, EntryKind::Directory | EntryKind::Submodule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub name: String,
    /// Repository-relative path of the entry.
    pub path: String,
    /// Site link: a tree/blob view, or the cross-link for submodules.
    pub link: String,
    pub kind: EntryKind,
    pub submodule_target: Option<String>,
    pub last_commit: Option<CommitSummary>,
}

impl Entry {
    pub fn is_parent(&self) -> bool {
        self.kind == EntryKind::Directory && self.name == ".."
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitSummary {
    pub oid: String,
    pub author_name: String,
    pub author_email: String,
    pub message: String,
    pub timestamp: i64,
    pub relative_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreadcrumbItem {
    pub name: String,
    pub path: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub org: String,
    pub repo: String,
    pub reference: String,
    pub commit: String,
    pub branch_path: String,
    pub is_root: bool,
    pub clone_url: String,
    pub breadcrumb: Vec<BreadcrumbItem>,
    pub entries: Vec<Entry>,
    /// Blob link of this directory's README.md, when it has one.
    pub readme_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobView {
    pub name: String,
    pub path: String,
    pub size: usize,
    pub raw_path: String,
    pub lang: String,
    pub breadcrumb: Vec<BreadcrumbItem>,
}
