use git2::{BranchType, Oid, Repository};

use crate::error::{AppError, Result};

/// What a browse request names: `/<org>/<repo>/(tree|blob)/<ref_name>/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    pub org: String,
    pub repo: String,
    pub ref_name: String,
}

/// A reference pinned to a concrete commit and that commit's root tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTree {
    pub commit: Oid,
    pub tree: Oid,
}

/// Resolve `ref_name` against the local branches first, then as a commit hash.
///
/// Branch names are unique, so the first short-name match wins.
pub fn resolve_reference(repo: &Repository, ref_name: &str) -> Result<ResolvedTree> {
    let commit_id = match find_branch(repo, ref_name)? {
        Some(oid) => oid,
        None => Oid::from_str(ref_name).map_err(|_| AppError::RefNotFound(ref_name.to_string()))?,
    };

    let commit = repo
        .find_commit(commit_id)
        .map_err(|_| AppError::RefNotFound(ref_name.to_string()))?;
    let tree = commit.tree()?;

    Ok(ResolvedTree {
        commit: commit.id(),
        tree: tree.id(),
    })
}

fn find_branch(repo: &Repository, ref_name: &str) -> Result<Option<Oid>> {
    for branch in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = branch?;
        if branch.name()? == Some(ref_name) {
            return Ok(Some(branch.get().peel_to_commit()?.id()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_support::{Node, TestRepo};
    use tempfile::TempDir;

    fn fixture() -> (TempDir, TestRepo, Oid, Oid) {
        let dir = TempDir::new().unwrap();
        let mut repo = TestRepo::create(dir.path(), "acme", "widgets");
        let first = repo.write("a.txt", Node::File("one")).commit("first");
        let second = repo.write("a.txt", Node::File("two")).commit("second");
        (dir, repo, first, second)
    }

    #[test]
    fn resolves_branch_name() {
        let (_dir, repo, first, second) = fixture();
        repo.branch("stable", first);

        let main = resolve_reference(repo.git(), "main").unwrap();
        assert_eq!(main.commit, second);

        let stable = resolve_reference(repo.git(), "stable").unwrap();
        assert_eq!(stable.commit, first);
        assert_eq!(stable.tree, repo.git().find_commit(first).unwrap().tree_id());
    }

    #[test]
    fn resolves_full_hash() {
        let (_dir, repo, first, _) = fixture();
        let resolved = resolve_reference(repo.git(), &first.to_string()).unwrap();
        assert_eq!(resolved.commit, first);
    }

    #[test]
    fn branch_name_takes_precedence_over_hash() {
        let (_dir, repo, first, second) = fixture();
        // A branch literally named like another commit's hash.
        repo.branch(&first.to_string(), second);
        let resolved = resolve_reference(repo.git(), &first.to_string()).unwrap();
        assert_eq!(resolved.commit, second);
    }

    #[test]
    fn unknown_refs() {
        let (_dir, repo, _, _) = fixture();
        for name in ["nope", "feature/x", "0123456789012345678901234567890123456789", ""] {
            assert!(
                matches!(resolve_reference(repo.git(), name), Err(AppError::RefNotFound(_))),
                "{} resolved",
                name
            );
        }
    }
}
