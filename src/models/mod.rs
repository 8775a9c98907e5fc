//! Data transfer objects (DTOs) for API responses.
//!
//! These structs are serialized to JSON for the front-end renderer.
//! - `tree`: Entry, CommitSummary, BreadcrumbItem, Listing, BlobView
//! - `repo`: OrgInfo, RepoInfo, HomeResponse, sign-in request/response

pub mod repo;
pub mod tree;

pub use repo::*;
pub use tree::*;
