//! `tree` and `blob` views.
//!
//! Paths have the shape `/<org>/<repo>/<tree|blob>/<ref>/<path...>`. The
//! reference is a single segment, so branch names containing `/` cannot be
//! addressed. Segments arrive percent-encoded and are decoded as UTF-8.
//! Anything that does not parse, and any organization the caller may not
//! read, answers 404.

use std::path::Path;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Uri},
    response::{IntoResponse, Response},
    Extension, Json, Router,
};
use percent_encoding::percent_decode_str;
use serde::Deserialize;

use crate::auth::Identity;
use crate::error::{AppError, Result};
use crate::git::blocking;
use crate::git::navigation::{build_breadcrumb, Links};
use crate::git::tree::list_directory;
use crate::git::RepositoryReference;
use crate::models::BlobView;
use crate::state::SharedState;

const FALLBACK_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub fn routes(state: SharedState) -> Router {
    Router::new().fallback(browse).with_state(state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Tree,
    Blob,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseTarget {
    pub reference: RepositoryReference,
    pub mode: ViewMode,
    pub segments: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BlobQuery {
    raw: Option<String>,
}

impl BlobQuery {
    fn wants_raw(&self) -> bool {
        self.raw.as_deref() == Some("true")
    }
}

/// Decode one path segment. Invalid UTF-8, an encoded `/` and the `.`/`..`
/// names are rejected.
fn decode_segment(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if decoded.contains('/') || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded.into_owned())
}

pub fn parse_browse_path(path: &str) -> Option<BrowseTarget> {
    let mut parts = path.strip_prefix('/')?.trim_end_matches('/').split('/');

    let org = parts.next().filter(|s| !s.is_empty()).and_then(decode_segment)?;
    let repo = parts.next().filter(|s| !s.is_empty()).and_then(decode_segment)?;
    let mode = match parts.next()? {
        "tree" => ViewMode::Tree,
        "blob" => ViewMode::Blob,
        _ => return None,
    };
    let ref_name = parts.next().filter(|s| !s.is_empty()).and_then(decode_segment)?;

    let mut segments = Vec::new();
    for part in parts.filter(|p| !p.is_empty()) {
        segments.push(decode_segment(part)?);
    }

    Some(BrowseTarget {
        reference: RepositoryReference { org, repo, ref_name },
        mode,
        segments,
    })
}

async fn browse(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<BlobQuery>,
    uri: Uri,
) -> Result<Response> {
    let target = parse_browse_path(uri.path()).ok_or(AppError::NotFound)?;
    if !state.can_read(identity.as_str(), &target.reference.org) {
        tracing::debug!(
            "{} may not read {}",
            identity.as_str(),
            target.reference.org
        );
        return Err(AppError::NotFound);
    }

    match target.mode {
        ViewMode::Tree => {
            let listing = list_directory(
                &state.store,
                &state.annotator,
                &state.config.hostname,
                target.reference,
                target.segments,
            )
            .await?;
            Ok(Json(listing).into_response())
        }
        ViewMode::Blob => show_blob(state, target, uri.path(), query.wants_raw()).await,
    }
}

async fn show_blob(state: SharedState, target: BrowseTarget, path: &str, raw: bool) -> Result<Response> {
    let blob = {
        let store = state.store.clone();
        let reference = target.reference.clone();
        let segments = target.segments.clone();
        blocking(move || store.read_blob(&reference, &segments)).await?
    };

    // read_blob rejects an empty path, so there is always a last segment.
    let name = target.segments.last().cloned().unwrap_or_default();

    if raw || blob.is_binary {
        let content_type = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE);
        return Ok(([(header::CONTENT_TYPE, content_type)], Body::from(blob.data)).into_response());
    }

    let links = Links::new(
        &target.reference.org,
        &target.reference.repo,
        &target.reference.ref_name,
    );
    let lang = Path::new(&name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("none")
        .to_string();

    Ok(Json(BlobView {
        size: blob.data.len(),
        raw_path: format!("{}?raw=true", path),
        breadcrumb: build_breadcrumb(&links.branch_path(), &target.segments),
        path: target.segments.join("/"),
        lang,
        name,
    })
    .into_response())
}
