//! Repository access and the tree browsing engine.
//!
//! - `repository`: on-disk repository layout, org/repo overview
//! - `resolve`: branch-or-hash reference resolution
//! - `classify` / `submodule`: entry kinds and submodule cross-links
//! - `annotate`: concurrent last-commit annotation
//! - `navigation`: listing order, breadcrumbs, site links
//! - `tree`: the `tree`/`blob` views built from the above

pub mod annotate;
pub mod classify;
pub mod navigation;
pub mod repository;
pub mod resolve;
pub mod submodule;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use annotate::Annotator;
pub use repository::RepoStore;
pub use resolve::RepositoryReference;

use crate::error::{AppError, Result};

/// Run blocking repository work off the async executor.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}
