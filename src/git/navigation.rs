//! Listing order and navigation links.

use std::cmp::Ordering;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::models::{BreadcrumbItem, Entry, EntryKind};

pub const PARENT_NAME: &str = "..";

/// Bytes that cannot appear literally inside one URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode each `/`-separated segment of a repository path.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Site links for one `(org, repo, ref)`.
#[derive(Debug, Clone)]
pub struct Links {
    org: String,
    repo: String,
    reference: String,
}

impl Links {
    pub fn new(org: &str, repo: &str, reference: &str) -> Self {
        Self {
            org: org.to_string(),
            repo: repo.to_string(),
            reference: reference.to_string(),
        }
    }

    /// `/<org>/<repo>/tree/<ref>`
    pub fn branch_path(&self) -> String {
        self.view("tree", "")
    }

    pub fn tree(&self, path: &str) -> String {
        self.view("tree", path)
    }

    pub fn blob(&self, path: &str) -> String {
        self.view("blob", path)
    }

    pub fn for_kind(&self, kind: EntryKind, path: &str) -> String {
        match kind {
            EntryKind::File | EntryKind::Symlink => self.blob(path),
            EntryKind::Directory | EntryKind::Submodule => self.tree(path),
        }
    }

    pub fn clone_url(&self, hostname: &str) -> String {
        format!("git@{}:{}/{}.git", hostname, self.org, self.repo)
    }

    fn view(&self, mode: &str, path: &str) -> String {
        let base = format!(
            "/{}/{}/{}/{}",
            encode_path(&self.org),
            encode_path(&self.repo),
            mode,
            utf8_percent_encode(&self.reference, SEGMENT)
        );
        if path.is_empty() {
            base
        } else {
            format!("{}/{}", base, encode_path(path))
        }
    }
}

pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// The synthetic `..` entry of a non-root listing at `segments`.
pub fn parent_entry(links: &Links, segments: &[String]) -> Entry {
    let parent = segments[..segments.len().saturating_sub(1)].join("/");
    Entry {
        name: PARENT_NAME.to_string(),
        link: links.tree(&parent),
        path: parent,
        kind: EntryKind::Directory,
        submodule_target: None,
        last_commit: None,
    }
}

/// Directories and submodules first, then files and symlinks; each group by
/// case-sensitive byte order of the name. `..` always leads, even ahead of
/// names starting with bytes below `.` such as `-` or `#`.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(compare_entries);
}

fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    b.is_parent()
        .cmp(&a.is_parent())
        .then_with(|| b.kind.is_folder().cmp(&a.kind.is_folder()))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn build_breadcrumb(branch_path: &str, segments: &[String]) -> Vec<BreadcrumbItem> {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| BreadcrumbItem {
            name: segment.clone(),
            path: format!("{}/{}", branch_path, encode_path(&segments[..=i].join("/"))),
            is_current: i == segments.len() - 1,
        })
        .collect()
}
