//! In-process git fixtures for tests.
//!
//! Builds bare repositories under `<root>/<org>/<repo>.git` directly through
//! git2 (tree builder + commits with fixed signatures), so tests neither need
//! a `git` binary nor depend on the wall clock.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature, Time};

use crate::git::RepoStore;

const BRANCH_REF: &str = "refs/heads/main";
const EPOCH: i64 = 1_500_000_000;

#[derive(Debug, Clone)]
pub enum Node {
    File(&'static str),
    Exec(&'static str),
    Link(&'static str),
    Gitlink(Oid),
}

impl Node {
    fn write(&self, repo: &Repository) -> (Oid, i32) {
        match self {
            Node::File(content) => (repo.blob(content.as_bytes()).unwrap(), 0o100644),
            Node::Exec(content) => (repo.blob(content.as_bytes()).unwrap(), 0o100755),
            Node::Link(target) => (repo.blob(target.as_bytes()).unwrap(), 0o120000),
            Node::Gitlink(oid) => (*oid, 0o160000),
        }
    }
}

pub struct TestRepo {
    root: PathBuf,
    repo: Repository,
    files: BTreeMap<String, Node>,
    head: Option<Oid>,
    clock: i64,
    author: String,
}

impl TestRepo {
    pub fn create(root: &Path, org: &str, name: &str) -> Self {
        let path = root.join(org).join(format!("{}.git", name));
        std::fs::create_dir_all(&path).unwrap();
        let repo = Repository::init_bare(&path).unwrap();
        repo.set_head(BRANCH_REF).unwrap();
        Self {
            root: root.to_path_buf(),
            repo,
            files: BTreeMap::new(),
            head: None,
            clock: EPOCH,
            author: "Alice".to_string(),
        }
    }

    pub fn store(&self) -> RepoStore {
        RepoStore::new(&self.root)
    }

    pub fn git(&self) -> &Repository {
        &self.repo
    }

    pub fn write(&mut self, path: &str, node: Node) -> &mut Self {
        self.files.insert(path.to_string(), node);
        self
    }

    pub fn author(&mut self, name: &str) -> &mut Self {
        self.author = name.to_string();
        self
    }

    /// Commit the current file set on `main`, one hour after the previous commit.
    pub fn commit(&mut self, message: &str) -> Oid {
        self.clock += 3600;
        let email = format!("{}@example.com", self.author.to_lowercase());
        let sig = Signature::new(&self.author, &email, &Time::new(self.clock, 0)).unwrap();

        let tree_id = write_tree(&self.repo, &self.files);
        let tree = self.repo.find_tree(tree_id).unwrap();
        let parents = self
            .head
            .map(|h| self.repo.find_commit(h).unwrap())
            .into_iter()
            .collect::<Vec<_>>();
        let parent_refs = parents.iter().collect::<Vec<_>>();

        let oid = self
            .repo
            .commit(Some(BRANCH_REF), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
        self.head = Some(oid);
        oid
    }

    pub fn branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).unwrap();
        self.repo.branch(name, &commit, true).unwrap();
    }

    /// A commit object no branch points at, usable as a submodule pin.
    pub fn dangling_commit(&self) -> Oid {
        let sig = Signature::new("Bob", "bob@example.com", &Time::new(EPOCH, 0)).unwrap();
        let tree_id = self.repo.treebuilder(None).unwrap().write().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        self.repo.commit(None, &sig, &sig, "elsewhere", &tree, &[]).unwrap()
    }
}

fn write_tree(repo: &Repository, files: &BTreeMap<String, Node>) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    let mut dirs: BTreeMap<String, BTreeMap<String, Node>> = BTreeMap::new();

    for (path, node) in files {
        match path.split_once('/') {
            Some((dir, rest)) => {
                dirs.entry(dir.to_string())
                    .or_default()
                    .insert(rest.to_string(), node.clone());
            }
            None => {
                let (oid, mode) = node.write(repo);
                builder.insert(path, oid, mode).unwrap();
            }
        }
    }
    for (dir, children) in dirs {
        let oid = write_tree(repo, &children);
        builder.insert(&dir, oid, 0o040000).unwrap();
    }

    builder.write().unwrap()
}
