use git2::{ObjectType, Oid};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::git::annotate::{Annotator, README};
use crate::git::blocking;
use crate::git::classify::classify;
use crate::git::navigation::{Links, build_breadcrumb, join_path, parent_entry, sort_entries};
use crate::git::repository::RepoStore;
use crate::git::resolve::{RepositoryReference, resolve_reference};
use crate::git::submodule::{SubmoduleConfig, cross_link};
use crate::models::{Entry, EntryKind, Listing};

/// Directory children collected from the object store, before annotation.
struct PreparedListing {
    repo_path: PathBuf,
    commit: Oid,
    entries: Vec<Entry>,
}

/// Raw content of a file at some reference.
#[derive(Debug)]
pub struct BlobContent {
    pub data: Vec<u8>,
    pub is_binary: bool,
}

impl RepoStore {
    fn prepare_listing(&self, reference: &RepositoryReference, segments: &[String]) -> Result<PreparedListing> {
        let repo_path = self.repo_path(&reference.org, &reference.repo)?;
        let repo = self.open(&reference.org, &reference.repo)?;
        let resolved = resolve_reference(&repo, &reference.ref_name)?;
        let root = repo.find_tree(resolved.tree)?;
        let modules = SubmoduleConfig::from_tree(&repo, &root)?;

        let dir_path = segments.join("/");
        let dir = if dir_path.is_empty() {
            root
        } else {
            let entry = root
                .get_path(Path::new(&dir_path))
                .map_err(|_| AppError::PathNotFound(dir_path.clone()))?;
            if entry.kind() != Some(ObjectType::Tree) {
                return Err(AppError::NotADirectory(dir_path));
            }
            repo.find_tree(entry.id())?
        };

        let links = Links::new(&reference.org, &reference.repo, &reference.ref_name);
        let mut entries = Vec::with_capacity(dir.len() + 1);
        if !segments.is_empty() {
            entries.push(parent_entry(&links, segments));
        }

        for child in dir.iter() {
            let Some(name) = child.name() else {
                tracing::warn!("skipping non UTF-8 entry in {}/{}", reference.repo, dir_path);
                continue;
            };
            let Some(kind) = classify(child.filemode()) else {
                continue;
            };
            let path = join_path(&dir_path, name);

            let submodule_target = if kind == EntryKind::Submodule {
                modules
                    .as_ref()
                    .and_then(|m| m.url_for(&path, name))
                    .map(|url| cross_link(url, &child.id().to_string(), self.root()))
            } else {
                None
            };
            let link = submodule_target
                .clone()
                .unwrap_or_else(|| links.for_kind(kind, &path));

            entries.push(Entry {
                name: name.to_string(),
                path,
                link,
                kind,
                submodule_target,
                last_commit: None,
            });
        }

        Ok(PreparedListing {
            repo_path,
            commit: resolved.commit,
            entries,
        })
    }

    pub fn read_blob(&self, reference: &RepositoryReference, segments: &[String]) -> Result<BlobContent> {
        let path = segments.join("/");
        if path.is_empty() {
            return Err(AppError::NotAFile(path));
        }

        let repo = self.open(&reference.org, &reference.repo)?;
        let resolved = resolve_reference(&repo, &reference.ref_name)?;
        let root = repo.find_tree(resolved.tree)?;

        let entry = root
            .get_path(Path::new(&path))
            .map_err(|_| AppError::PathNotFound(path.clone()))?;
        if entry.kind() != Some(ObjectType::Blob) {
            return Err(AppError::NotAFile(path));
        }
        let blob = repo.find_blob(entry.id())?;

        Ok(BlobContent {
            data: blob.content().to_vec(),
            is_binary: blob.is_binary(),
        })
    }
}

/// Build the full `tree` view of `segments` at `reference`.
pub async fn list_directory(
    store: &RepoStore,
    annotator: &Annotator,
    hostname: &str,
    reference: RepositoryReference,
    segments: Vec<String>,
) -> Result<Listing> {
    let prepared = {
        let store = store.clone();
        let reference = reference.clone();
        let segments = segments.clone();
        blocking(move || store.prepare_listing(&reference, &segments)).await?
    };

    let annotated = annotator
        .annotate(&prepared.repo_path, prepared.commit, prepared.entries)
        .await?;
    let mut entries = annotated.entries;
    sort_entries(&mut entries);

    let links = Links::new(&reference.org, &reference.repo, &reference.ref_name);
    let branch_path = links.branch_path();
    let dir_path = segments.join("/");
    let readme_path = annotated
        .has_readme
        .then(|| links.blob(&join_path(&dir_path, README)));

    Ok(Listing {
        breadcrumb: build_breadcrumb(&branch_path, &segments),
        is_root: segments.is_empty(),
        clone_url: links.clone_url(hostname),
        commit: prepared.commit.to_string(),
        branch_path,
        entries,
        readme_path,
        org: reference.org,
        repo: reference.repo,
        reference: reference.ref_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnotateConfig;
    use crate::git::test_support::{Node, TestRepo};
    use tempfile::TempDir;

    fn reference(ref_name: &str) -> RepositoryReference {
        RepositoryReference {
            org: "acme".to_string(),
            repo: "widgets".to_string(),
            ref_name: ref_name.to_string(),
        }
    }

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn annotator() -> Annotator {
        Annotator::new(&AnnotateConfig::default())
    }

    struct Fixture {
        pin: Oid,
        first: Oid,
        second: Oid,
    }

    fn fixture() -> (TempDir, TestRepo, Fixture) {
        let dir = TempDir::new().unwrap();
        let mut repo = TestRepo::create(dir.path(), "acme", "widgets");
        let pin = repo.dangling_commit();
        let first = repo
            .author("Alice")
            .write("README.md", Node::File("# widgets"))
            .write("Cargo.toml", Node::File("[package]"))
            .write("src/main.rs", Node::File("fn main() {}"))
            .write("src/util/mod.rs", Node::File("// util"))
            .write("bin/run", Node::Exec("#!/bin/sh"))
            .write("latest", Node::Link("src/main.rs"))
            .write("vendor/lib", Node::Gitlink(pin))
            .write(".gitmodules", Node::File("[submodule \"lib\"]\n\tpath = vendor/lib\n\turl = git@git.example.com:acme/lib.git\n"))
            .commit("initial import");
        let second = repo
            .author("Bob")
            .write("src/main.rs", Node::File("fn main() { run() }"))
            .commit("call run");
        (dir, repo, Fixture { pin, first, second })
    }

    #[tokio::test]
    async fn root_listing() {
        let (_dir, repo, fx) = fixture();
        let listing = list_directory(&repo.store(), &annotator(), "git.example.com", reference("main"), vec![])
            .await
            .unwrap();

        assert!(listing.is_root);
        assert_eq!(listing.commit, fx.second.to_string());
        assert_eq!(listing.branch_path, "/acme/widgets/tree/main");
        assert_eq!(listing.clone_url, "git@git.example.com:acme/widgets.git");
        assert!(listing.breadcrumb.is_empty());
        assert_eq!(listing.readme_path.as_deref(), Some("/acme/widgets/blob/main/README.md"));

        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["bin", "src", "vendor", ".gitmodules", "Cargo.toml", "README.md", "latest"]
        );
        assert!(listing.entries.iter().all(|e| !e.is_parent()));

        let latest = listing.entries.iter().find(|e| e.name == "latest").unwrap();
        assert_eq!(latest.kind, EntryKind::Symlink);
        assert_eq!(latest.link, "/acme/widgets/blob/main/latest");

        let src = listing.entries.iter().find(|e| e.name == "src").unwrap();
        assert_eq!(src.kind, EntryKind::Directory);
        assert_eq!(src.last_commit.as_ref().unwrap().author_name, "Bob");

        let readme = listing.entries.iter().find(|e| e.name == "README.md").unwrap();
        assert_eq!(readme.last_commit.as_ref().unwrap().author_name, "Alice");

        let vendor = listing.entries.iter().find(|e| e.name == "vendor").unwrap();
        assert_eq!(vendor.kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn nested_listing_has_parent_and_submodule_link() {
        let (_dir, repo, fx) = fixture();
        let listing = list_directory(
            &repo.store(),
            &annotator(),
            "git.example.com",
            reference("main"),
            segments(&["vendor"]),
        )
        .await
        .unwrap();

        assert!(!listing.is_root);
        assert!(listing.readme_path.is_none());
        assert_eq!(listing.entries.len(), 2);
        assert!(listing.entries[0].is_parent());
        assert_eq!(listing.entries[0].link, "/acme/widgets/tree/main");

        let lib = &listing.entries[1];
        assert_eq!(lib.kind, EntryKind::Submodule);
        let expected = format!("/acme/lib/tree/{}", fx.pin);
        assert_eq!(lib.submodule_target.as_deref(), Some(expected.as_str()));
        assert_eq!(lib.link, expected);
        assert_eq!(lib.last_commit.as_ref().unwrap().message, "initial import");

        assert_eq!(listing.breadcrumb.len(), 1);
        assert_eq!(listing.breadcrumb[0].path, "/acme/widgets/tree/main/vendor");
        assert!(listing.breadcrumb[0].is_current);
    }

    #[tokio::test]
    async fn deep_listing_links() {
        let (_dir, repo, _) = fixture();
        let listing = list_directory(
            &repo.store(),
            &annotator(),
            "git.example.com",
            reference("main"),
            segments(&["src", "util"]),
        )
        .await
        .unwrap();

        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "mod.rs"]);
        assert_eq!(listing.entries[0].link, "/acme/widgets/tree/main/src");
        assert_eq!(listing.entries[1].path, "src/util/mod.rs");
        assert_eq!(listing.entries[1].link, "/acme/widgets/blob/main/src/util/mod.rs");
        assert_eq!(listing.breadcrumb[0].path, "/acme/widgets/tree/main/src");
        assert_eq!(listing.breadcrumb[1].path, "/acme/widgets/tree/main/src/util");
    }

    #[tokio::test]
    async fn listing_by_commit_hash_sees_old_state() {
        let (_dir, repo, fx) = fixture();
        let first = fx.first;

        let listing = list_directory(
            &repo.store(),
            &annotator(),
            "git.example.com",
            reference(&first.to_string()),
            vec![],
        )
        .await
        .unwrap();
        let src = listing.entries.iter().find(|e| e.name == "src").unwrap();
        assert_eq!(src.last_commit.as_ref().unwrap().author_name, "Alice");
        assert_eq!(src.link, format!("/acme/widgets/tree/{}/src", first));
    }

    #[tokio::test]
    async fn listing_is_deterministic() {
        let (_dir, repo, _) = fixture();
        let store = repo.store();
        let mut outputs = Vec::new();
        for concurrency in [1, 3, 16] {
            let annotator = Annotator::new(&AnnotateConfig {
                concurrency,
                timeout_secs: 30,
            });
            let listing = list_directory(&store, &annotator, "h", reference("main"), vec![])
                .await
                .unwrap();
            outputs.push(serde_json::to_string(&listing.entries).unwrap());
        }
        assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn listing_errors() {
        let (_dir, repo, _) = fixture();
        let store = repo.store();

        let err = list_directory(&store, &annotator(), "h", reference("nope"), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RefNotFound(_)));

        let err = list_directory(&store, &annotator(), "h", reference("main"), segments(&["missing"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PathNotFound(_)));

        let err = list_directory(&store, &annotator(), "h", reference("main"), segments(&["Cargo.toml"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotADirectory(_)));

        let mut missing = reference("main");
        missing.repo = "gadgets".to_string();
        let err = list_directory(&store, &annotator(), "h", missing, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RepoNotFound(_)));
    }

    #[test]
    fn submodule_without_config_has_no_target() {
        let dir = TempDir::new().unwrap();
        let mut repo = TestRepo::create(dir.path(), "acme", "widgets");
        let pin = repo.dangling_commit();
        repo.write("lib", Node::Gitlink(pin)).commit("add lib");

        let prepared = repo.store().prepare_listing(&reference("main"), &[]).unwrap();
        let lib = &prepared.entries[0];
        assert_eq!(lib.kind, EntryKind::Submodule);
        assert!(lib.submodule_target.is_none());
        assert_eq!(lib.link, "/acme/widgets/tree/main/lib");
    }

    #[test]
    fn read_blob_contents() {
        let (_dir, repo, _) = fixture();
        let store = repo.store();

        let blob = store.read_blob(&reference("main"), &segments(&["src", "main.rs"])).unwrap();
        assert_eq!(blob.data, b"fn main() { run() }");
        assert!(!blob.is_binary);

        let link = store.read_blob(&reference("main"), &segments(&["latest"])).unwrap();
        assert_eq!(link.data, b"src/main.rs");

        assert!(matches!(
            store.read_blob(&reference("main"), &segments(&["src"])),
            Err(AppError::NotAFile(_))
        ));
        assert!(matches!(
            store.read_blob(&reference("main"), &segments(&["vendor", "lib"])),
            Err(AppError::NotAFile(_))
        ));
        assert!(matches!(
            store.read_blob(&reference("main"), &segments(&["nope.txt"])),
            Err(AppError::PathNotFound(_))
        ));
        assert!(matches!(store.read_blob(&reference("main"), &[]), Err(AppError::NotAFile(_))));
    }
}
